use iced::widget::{button, scrollable, text, Column};
use iced::{Element, Length, Theme};

use crate::state::session::Session;
use crate::Message;

/// Every image in session order; finalized entries are highlighted green
pub fn view(session: &Session, current: Option<usize>) -> Element<'_, Message> {
    let entries = session.images().iter().enumerate().map(|(index, record)| {
        let finalized = session.is_finalized(&record.name);
        let style: fn(&Theme, button::Status) -> button::Style = if current == Some(index) {
            button::primary
        } else if finalized {
            button::success
        } else {
            button::text
        };
        let label = if finalized {
            format!("✓ {}", record.name)
        } else {
            record.name.clone()
        };

        button(text(label).size(13))
            .width(Length::Fill)
            .padding([2, 6])
            .style(style)
            .on_press(Message::SelectImage(index))
            .into()
    });

    scrollable(Column::with_children(entries).spacing(2).padding(4))
        .width(Length::Fixed(280.0))
        .height(Length::Fill)
        .into()
}
