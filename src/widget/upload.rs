use super::{ChatWidget, UPLOAD_APOLOGY};
use crate::api::ImageUpload;
use crate::models::Message;
use crate::ui::output::{log_error, log_verbose};

impl ChatWidget {
    /// Upload an image and stage the returned URL for the next message.
    pub async fn upload_image(&mut self, upload: ImageUpload) -> Option<String> {
        self.set_uploading(true);
        log_verbose(
            self.settings.verbose,
            &format!(
                "Uploading {} ({} bytes, {})",
                upload.file_name,
                upload.bytes.len(),
                upload.content_type
            ),
        );

        let staged = match self.backend.upload(&upload).await {
            Ok(url) => {
                self.stage_image(Some(url.clone()));
                Some(url)
            }
            Err(e) => {
                log_error(&format!("Error uploading image: {}", e));
                self.stage_image(None);
                self.push_message(Message::bot(UPLOAD_APOLOGY));
                None
            }
        };

        self.set_uploading(false);
        staged
    }

    /// Drop the staged image without sending it.
    pub fn clear_staged_image(&mut self) {
        self.stage_image(None);
    }

    fn stage_image(&mut self, url: Option<String>) {
        if self.staged_image != url {
            self.staged_image = url.clone();
            self.emit(super::WidgetEvent::StagedImageChanged(url));
        }
    }
}
