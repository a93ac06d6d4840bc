use iced::widget::{button, column, radio, row, text, text_input, Column};
use iced::{Color, Element, Length};

use crate::state::roi::RoiType;
use crate::state::session::Session;
use crate::Message;

fn action(label: &str, message: Option<Message>) -> Element<'_, Message> {
    button(text(label))
        .width(Length::Fill)
        .padding(12)
        .on_press_maybe(message)
        .into()
}

/// Control bar: session actions, ROI type selector and camera id
///
/// Image actions are disabled while no image is displayed.
pub fn view(session: Option<&Session>, has_image: bool) -> Element<'_, Message> {
    let when_image = |message: Message| has_image.then_some(message);
    let can_copy = has_image && session.is_some_and(|s| s.template().is_some());

    let mut bar: Column<Message> = column![
        action("Save", session.map(|_| Message::Save)),
        action("Clear ROI", when_image(Message::ClearRoi)),
        action("Apply ROI", when_image(Message::ApplyRoi)),
        action("Copy Previous ROI", can_copy.then_some(Message::CopyPrevious)),
        action("Finalize Image", when_image(Message::Finalize)),
    ]
    .spacing(6);

    if let Some(session) = session {
        let selected = session.selected_roi();
        for roi in RoiType::ALL {
            let [r, g, b] = roi.rgb();
            bar = bar.push(
                row![
                    radio(roi.key(), roi, selected, Message::RoiSelected),
                    text("●").color(Color::from_rgb8(r, g, b)),
                ]
                .spacing(6),
            );
        }

        bar = bar.push(text("Camera id").size(13)).push(
            text_input("camera id", session.camera_id())
                .on_input(Message::CameraIdChanged)
                .padding(6),
        );
    }

    bar.push(action("Open Folder", Some(Message::OpenFolder)))
        .push(action("Quit", Some(Message::Quit)))
        .width(Length::Fixed(170.0))
        .padding(10)
        .into()
}
