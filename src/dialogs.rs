/// Native dialogs
///
/// Thin wrappers over rfd so the update loop reads as plain questions.
/// All dialogs are modal and block the UI thread until answered.

use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use std::path::{Path, PathBuf};

/// Ask for a camera image directory
pub fn pick_folder() -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Select Camera Image Folder")
        .pick_folder()
}

/// Ask where to write the CSV summary
pub fn pick_save_path(directory: &Path, camera_id: &str) -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Save ROI Summary")
        .set_directory(directory)
        .set_file_name(format!("{camera_id}_roi.csv"))
        .add_filter("CSV", &["csv"])
        .save_file()
}

/// Yes/No question; true only for an explicit "Yes"
pub fn confirm(title: &str, description: &str) -> bool {
    let answer = MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::YesNo)
        .show();
    matches!(answer, MessageDialogResult::Yes)
}

/// Report a failure to the user
pub fn error(title: &str, description: &str) {
    MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::Ok)
        .show();
}
