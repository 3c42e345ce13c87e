//! Lock screen drawing

use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph};
use sflock_core::Background;

use crate::theme::Theme;

/// Draw the lock screen: a short rule across the middle and the masked
/// field centred beneath it. Only `count` reaches this function.
pub fn draw(frame: &mut Frame, count: usize, background: Background, theme: &Theme) {
    let area = frame.area();
    let base = theme.base(background);

    frame.render_widget(Block::default().style(base), area);
    if area.height == 0 || area.width == 0 {
        return;
    }

    let (rule, field) = layout(area);

    let rule_text = theme.rule.to_string().repeat(rule.width as usize);
    frame.render_widget(Paragraph::new(rule_text).style(base), rule);

    let mask_text = theme.mask.to_string().repeat(count.min(field.width as usize));
    frame.render_widget(
        Paragraph::new(mask_text)
            .style(base)
            .alignment(Alignment::Center),
        field,
    );
}

/// Rule spans 3/8..5/8 of the width on the middle row; the field is the
/// row below it (or the same row on a one-line screen)
fn layout(area: Rect) -> (Rect, Rect) {
    let width = u32::from(area.width);
    let start = (width * 3 / 8) as u16;
    let end = (width * 5 / 8) as u16;

    let middle = area.y + area.height / 2;
    let below = (middle + 1).min(area.bottom() - 1);

    let rule = Rect::new(area.x + start, middle, end - start, 1);
    let field = Rect::new(area.x, below, area.width, 1);
    (rule, field)
}
