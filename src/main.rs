use clap::Parser;
use iced::keyboard::{self, key, Key};
use iced::widget::canvas::Cache;
use iced::widget::image::Handle;
use iced::widget::{column, row, text};
use iced::{Element, Length, Subscription, Task, Theme};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod catalog;
mod config;
mod dialogs;
mod error;
mod export;
mod state;
mod stats;
mod ui;

use catalog::loader::{self, LoadedImage};
use config::{Args, Settings};
use state::data::TimestampSource;
use state::roi::Point;
use state::session::Session;

/// The image currently shown on the canvas
struct Current {
    /// Position in the session's image order
    index: usize,
    name: String,
    /// Decoded pixels and GUI handle; `None` when the file failed to load
    image: Option<(LoadedImage, Handle)>,
}

/// Main application state
struct PhenoAnnotator {
    settings: Settings,
    /// Camera id given on the command line, applied to the first session
    camera_override: Option<String>,
    session: Option<Session>,
    current: Option<Current>,
    /// Rendered polygon overlay; cleared whenever it would change
    overlay_cache: Cache,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// Pick a directory and start a new session
    OpenFolder,
    /// Display the image at this position in the list
    SelectImage(usize),
    /// Pointer click on the image; `close` ends the polygon
    CanvasClicked { point: Point, close: bool },
    RoiSelected(state::roi::RoiType),
    CameraIdChanged(String),
    /// Manual export
    Save,
    /// Clear the selected ROI type on the displayed image
    ClearRoi,
    /// Compute color statistics for the displayed image
    ApplyRoi,
    Finalize,
    /// Copy the last finalized image's ROIs onto the displayed image
    CopyPrevious,
    Quit,
}

impl PhenoAnnotator {
    /// Create a new instance of the application
    fn new(args: Args) -> (Self, Task<Message>) {
        let settings = load_settings(args.config.as_deref());

        let mut app = PhenoAnnotator {
            settings,
            camera_override: args.camera_id,
            session: None,
            current: None,
            overlay_cache: Cache::new(),
            status: "Ready.".to_string(),
        };

        let task = match args.directory {
            Some(directory) => {
                app.start_session(directory);
                Task::none()
            }
            None => Task::done(Message::OpenFolder),
        };

        (app, task)
    }

    fn title(&self) -> String {
        match &self.current {
            Some(current) => format!("Phenology - {}", current.name),
            None => "Phenology".to_string(),
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenFolder => {
                if self.session.is_some()
                    && !dialogs::confirm(
                        "New session",
                        "Start a new session?\nThe current session will NOT be saved.",
                    )
                {
                    return Task::none();
                }
                self.choose_folder();
            }
            Message::SelectImage(index) => self.display_image(index),
            Message::CanvasClicked { point, close } => {
                let Some(name) = self.current_name() else {
                    return Task::none();
                };
                if let Some(session) = self.session.as_mut() {
                    match session.add_point(&name, point, close) {
                        Ok(Some(added)) => {
                            debug!(
                                "Added {} vertex at ({:.1}, {:.1}), edge {:?}, closing edge {:?}",
                                added.roi, point.x, point.y, added.edge, added.closing_edge
                            );
                            self.overlay_cache.clear();
                        }
                        Ok(None) => self.status = "Select an ROI type first.".to_string(),
                        Err(e) => warn!("{}", e),
                    }
                }
            }
            Message::RoiSelected(roi) => {
                if let Some(session) = self.session.as_mut() {
                    session.set_selected_roi(roi);
                }
            }
            Message::CameraIdChanged(camera_id) => {
                if let Some(session) = self.session.as_mut() {
                    session.set_camera_id(camera_id);
                }
            }
            Message::Save => self.save(),
            Message::ClearRoi => {
                let Some(name) = self.current_name() else {
                    return Task::none();
                };
                if let Some(session) = self.session.as_mut() {
                    match session.selected_roi() {
                        Some(roi) => {
                            if let Err(e) = session.clear_roi(&name, roi) {
                                warn!("{}", e);
                            }
                            self.overlay_cache.clear();
                            self.status = format!("Cleared {roi} on {name}");
                        }
                        None => self.status = "Select an ROI type to clear.".to_string(),
                    }
                }
            }
            Message::ApplyRoi => {
                if self.apply_roi() {
                    self.status = "Statistics updated.".to_string();
                }
            }
            Message::Finalize => {
                if self.has_image() {
                    self.finalize();
                }
            }
            Message::CopyPrevious => {
                // Also reached from the Space shortcut
                if !self.has_image() {
                    return Task::none();
                }
                let Some(name) = self.current_name() else {
                    return Task::none();
                };
                if let Some(session) = self.session.as_mut() {
                    match session.copy_forward(&name) {
                        Ok(true) => {
                            self.overlay_cache.clear();
                            self.status = "Copied ROIs from the last finalized image.".to_string();
                        }
                        Ok(false) => self.status = "No finalized image to copy from yet.".to_string(),
                        Err(e) => warn!("{}", e),
                    }
                }
            }
            Message::Quit => {
                if !dialogs::confirm("Quit session", "Quit this session?\nSession will NOT be saved.") {
                    return Task::none();
                }
                info!("Session closed");
                self.session = None;
                self.current = None;
                self.overlay_cache.clear();

                if dialogs::confirm("New session", "Start new session?") {
                    self.choose_folder();
                } else {
                    return iced::exit();
                }
            }
        }

        Task::none()
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let controls = ui::controls::view(self.session.as_ref(), self.has_image());

        let label = match (&self.session, &self.current) {
            (Some(session), Some(current)) => match session.get(&current.name) {
                Ok(record) => {
                    let (date, time) = record.date_time_strings();
                    let source = match record.date_source {
                        TimestampSource::Filename => "",
                        TimestampSource::Modified => " (file time)",
                        TimestampSource::Unknown => " (unknown)",
                    };
                    format!(
                        "Current file: {}   Date: {}   Time: {}{}",
                        record.path.display(),
                        date,
                        time,
                        source
                    )
                }
                Err(_) => "Current file: ".to_string(),
            },
            _ => "Current file: ".to_string(),
        };

        let picture: Element<Message> = match (&self.session, &self.current) {
            (Some(session), Some(current)) => match (&current.image, session.get(&current.name)) {
                (Some((loaded, handle)), Ok(record)) => ui::canvas::view(
                    handle,
                    loaded.width(),
                    loaded.height(),
                    ui::canvas::AnnotationOverlay {
                        coords: &record.coords,
                        cache: &self.overlay_cache,
                        point_radius: self.settings.point_radius,
                        line_width: self.settings.line_width,
                    },
                ),
                _ => ui::canvas::placeholder(format!("Could not display {}", current.name)),
            },
            _ => ui::canvas::placeholder("Open a folder of camera images to begin.".to_string()),
        };

        let main = column![text(label).size(14), picture, text(&self.status).size(14)]
            .spacing(8)
            .padding(8)
            .width(Length::Fill);

        let mut layout = row![controls, main];
        if let Some(session) = &self.session {
            let index = self.current.as_ref().map(|current| current.index);
            layout = layout.push(ui::file_list::view(session, index));
        }

        layout.height(Length::Fill).into()
    }

    /// Enter finalizes, Space copies the previous ROIs
    fn subscription(&self) -> Subscription<Message> {
        keyboard::on_key_press(|pressed, _modifiers| match pressed.as_ref() {
            Key::Named(key::Named::Enter) => Some(Message::Finalize),
            Key::Named(key::Named::Space) => Some(Message::CopyPrevious),
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }

    /// True when the displayed image decoded and can be annotated
    fn has_image(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|current| current.image.is_some())
    }

    fn current_name(&self) -> Option<String> {
        self.current.as_ref().map(|current| current.name.clone())
    }

    fn choose_folder(&mut self) {
        match dialogs::pick_folder() {
            Some(directory) => self.start_session(directory),
            None => self.status = "No folder selected.".to_string(),
        }
    }

    /// Scan a directory and replace the session with a fresh one
    fn start_session(&mut self, directory: PathBuf) {
        self.current = None;
        self.overlay_cache.clear();

        let catalog = match catalog::scan_directory(&directory, &self.settings.catalog_options()) {
            Ok(catalog) => catalog,
            Err(e) => {
                error!("Cannot open {}: {}", directory.display(), e);
                dialogs::error("Cannot open folder", &e.to_string());
                self.status = format!("Could not open {}", directory.display());
                return;
            }
        };

        let mut session = Session::new(catalog);
        if let Some(camera_id) = self.camera_override.take() {
            session.set_camera_id(camera_id);
        }
        session.set_selected_roi(self.settings.default_roi);
        self.status = format!("{} images loaded.", session.len());
        self.session = Some(session);
        self.display_image(0);
    }

    /// Switch the canvas to another image
    fn display_image(&mut self, index: usize) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Some(record) = session.images().get(index) else {
            return;
        };
        let (name, path) = (record.name.clone(), record.path.clone());

        // Release the previous image before decoding the next one
        self.current = None;
        self.overlay_cache.clear();

        let image = match loader::load(&path) {
            Ok(loaded) => {
                let handle = Handle::from_rgba(loaded.width(), loaded.height(), loaded.rgba_bytes());
                Some((loaded, handle))
            }
            Err(e) => {
                error!("Cannot load {}: {}", path.display(), e);
                dialogs::error("Cannot load image", &format!("{}: {}", path.display(), e));
                None
            }
        };

        self.current = Some(Current { index, name, image });
    }

    /// Compute statistics for the displayed image; false when nothing was computed
    fn apply_roi(&mut self) -> bool {
        let (Some(session), Some(current)) = (self.session.as_mut(), self.current.as_ref()) else {
            return false;
        };
        let Some((loaded, _)) = &current.image else {
            return false;
        };

        let stats = match session.get(&current.name) {
            Ok(record) => stats::compute(&loaded.pixels, &record.coords),
            Err(e) => {
                warn!("{}", e);
                return false;
            }
        };
        session.apply_stats(&current.name, stats).is_ok()
    }

    fn finalize(&mut self) {
        let Some(current) = self.current.as_ref() else {
            return;
        };
        let (name, index) = (current.name.clone(), current.index);

        self.apply_roi();
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let outcome = match session.finalize(&name) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("{}", e);
                return;
            }
        };
        self.status = format!(
            "{} {} ({}/{})",
            if outcome.newly_finalized { "Finalized" } else { "Finalized again:" },
            name,
            session.finalized_count(),
            session.len()
        );
        let next = index + 1;
        let has_next = next < session.len();

        if outcome.export_due {
            self.save();
        } else if has_next {
            self.display_image(next);
        }
    }

    /// Ask for a destination and write the CSV summary
    fn save(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Some(path) = dialogs::pick_save_path(session.directory(), session.camera_id()) else {
            self.status = "Save cancelled.".to_string();
            return;
        };

        match export::export_to_path(session, &path) {
            Ok(rows) => self.status = format!("Saved {} rows to {}", rows, path.display()),
            Err(e) => {
                error!("Saving {} failed: {}", path.display(), e);
                dialogs::error("Save failed", &format!("{}: {}", path.display(), e));
                self.status = "Save failed.".to_string();
            }
        }
    }
}

/// Load settings, falling back to defaults when the file is unusable
fn load_settings(path: Option<&std::path::Path>) -> Settings {
    let Some(path) = path.map(PathBuf::from).or_else(Settings::default_path) else {
        return Settings::default();
    };
    match Settings::load(&path) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Ignoring settings at {}: {}", path.display(), e);
            Settings::default()
        }
    }
}

/// Log filter from `RUST_LOG` directives, `info` when unset or invalid
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .init();

    let args = Args::parse();
    info!("Starting pheno-annotator v{}", env!("CARGO_PKG_VERSION"));

    iced::application(PhenoAnnotator::title, PhenoAnnotator::update, PhenoAnnotator::view)
        .subscription(PhenoAnnotator::subscription)
        .theme(PhenoAnnotator::theme)
        .centered()
        .run_with(move || PhenoAnnotator::new(args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::state::data::ImageRecord;
    use crate::state::roi::RoiType;

    /// App with a two-image session whose second image failed to decode
    fn app_showing_undecoded_image() -> PhenoAnnotator {
        let records = (0..2)
            .map(|i| {
                ImageRecord::new(
                    format!("img{i}.jpg"),
                    PathBuf::from(format!("/cam/img{i}.jpg")),
                    None,
                    TimestampSource::Unknown,
                    "cam".into(),
                )
            })
            .collect();
        let mut session = Session::new(Catalog {
            directory: PathBuf::from("/cam"),
            camera_id: "cam".into(),
            records,
        });
        session.set_selected_roi(RoiType::Canopy);
        session.add_point("img0.jpg", Point::new(1.0, 1.0), false).unwrap();
        session.finalize("img0.jpg").unwrap();

        PhenoAnnotator {
            settings: Settings::default(),
            camera_override: None,
            session: Some(session),
            current: Some(Current {
                index: 1,
                name: "img1.jpg".into(),
                image: None,
            }),
            overlay_cache: Cache::new(),
            status: String::new(),
        }
    }

    #[test]
    fn test_log_filter_honours_env_level() {
        use tracing::level_filters::LevelFilter;

        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(
            log_filter(Some("debug".into())).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(
            log_filter(Some("warn".into())).max_level_hint(),
            Some(LevelFilter::WARN)
        );
    }

    #[test]
    fn test_finalize_requires_decoded_image() {
        let mut app = app_showing_undecoded_image();
        let _ = app.update(Message::Finalize);

        let session = app.session.as_ref().unwrap();
        assert!(!session.is_finalized("img1.jpg"));
        assert_eq!(session.finalized_count(), 1);
    }

    #[test]
    fn test_copy_previous_requires_decoded_image() {
        let mut app = app_showing_undecoded_image();
        let _ = app.update(Message::CopyPrevious);

        let record = app.session.as_ref().unwrap().get("img1.jpg").unwrap();
        assert!(record.coords.is_empty());
    }
}
