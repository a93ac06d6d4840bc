use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Cache, Canvas, Path, Program, Stroke};
use iced::widget::image::{Handle, Image};
use iced::widget::{container, scrollable, stack, text};
use iced::{Color, ContentFit, Element, Length, Point as ScreenPoint, Rectangle, Renderer, Theme};

use crate::state::roi::{Point, RoiCoords, RoiType};
use crate::Message;

/// Polygon overlay drawn on top of the displayed image
///
/// The canvas has the image's pixel size, so cursor positions inside it are
/// image coordinates.
pub struct AnnotationOverlay<'a> {
    pub coords: &'a RoiCoords,
    /// Cleared by the application whenever the coordinates change or the image switches
    pub cache: &'a Cache,
    pub point_radius: f32,
    pub line_width: f32,
}

fn roi_color(roi: RoiType) -> Color {
    let [r, g, b] = roi.rgb();
    Color::from_rgb8(r, g, b)
}

fn screen(p: Point) -> ScreenPoint {
    ScreenPoint::new(p.x, p.y)
}

impl Program<Message> for AnnotationOverlay<'_> {
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        let Some(position) = cursor.position_in(bounds) else {
            return (canvas::event::Status::Ignored, None);
        };
        let point = Point::new(position.x, position.y);

        match event {
            // Primary click adds a vertex
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => (
                canvas::event::Status::Captured,
                Some(Message::CanvasClicked { point, close: false }),
            ),
            // Secondary click adds the last vertex and closes the polygon
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Right)) => (
                canvas::event::Status::Captured,
                Some(Message::CanvasClicked { point, close: true }),
            ),
            _ => (canvas::event::Status::Ignored, None),
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let overlay = self.cache.draw(renderer, bounds.size(), |frame| {
            for (roi, polygon) in self.coords.iter() {
                let color = roi_color(roi);

                let mut edges = canvas::path::Builder::new();
                for (from, to) in polygon.edges() {
                    edges.move_to(screen(from));
                    edges.line_to(screen(to));
                }
                frame.stroke(
                    &edges.build(),
                    Stroke::default().with_color(color).with_width(self.line_width),
                );

                for point in &polygon.points {
                    frame.fill(&Path::circle(screen(*point), self.point_radius), color);
                }
            }
        });

        vec![overlay]
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

/// Image at native size with the polygon overlay stacked on top, scrollable both ways
pub fn view<'a>(
    handle: &Handle,
    width: u32,
    height: u32,
    overlay: AnnotationOverlay<'a>,
) -> Element<'a, Message> {
    let (w, h) = (Length::Fixed(width as f32), Length::Fixed(height as f32));

    let picture = Image::new(handle.clone())
        .width(w)
        .height(h)
        .content_fit(ContentFit::Fill);
    let canvas = Canvas::new(overlay).width(w).height(h);

    scrollable(stack![picture, canvas])
        .direction(scrollable::Direction::Both {
            vertical: scrollable::Scrollbar::default(),
            horizontal: scrollable::Scrollbar::default(),
        })
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Shown when there is no image to draw on
pub fn placeholder<'a>(message: String) -> Element<'a, Message> {
    container(text(message).size(16))
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}
