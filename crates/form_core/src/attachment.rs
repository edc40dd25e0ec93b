use shared::domain::SheetFile;
use tracing::{debug, warn};

/// Emitted whenever the selected sheet changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentChanged {
    pub suggested_name: String,
    pub attached: bool,
}

/// The single sheet currently selected for conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileAttachment {
    file: Option<SheetFile>,
    suggested_name: String,
}

impl FileAttachment {
    pub fn on_file_change(&mut self, file: Option<SheetFile>) -> AttachmentChanged {
        match &file {
            Some(sheet) => {
                if sheet.kind().is_none() {
                    warn!(
                        file_name = sheet.file_name(),
                        "attached sheet is not png, jpeg or pdf; backend may reject it"
                    );
                }
                self.suggested_name = suggested_name(sheet.file_name());
                debug!(
                    file_name = sheet.file_name(),
                    size_bytes = sheet.size_bytes(),
                    "sheet attached"
                );
            }
            None => {
                self.suggested_name.clear();
                debug!("sheet detached");
            }
        }
        self.file = file;

        AttachmentChanged {
            suggested_name: self.suggested_name.clone(),
            attached: self.file.is_some(),
        }
    }

    pub fn file(&self) -> Option<&SheetFile> {
        self.file.as_ref()
    }

    pub fn suggested_name(&self) -> &str {
        &self.suggested_name
    }
}

/// Drops the last `.`-separated segment of `file_name`.
pub fn suggested_name(file_name: &str) -> String {
    let mut segments: Vec<&str> = file_name.split('.').collect();
    if segments.len() > 1 {
        segments.pop();
    }
    segments.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_only_the_last_extension() {
        assert_eq!(suggested_name("sonata.pdf"), "sonata");
        assert_eq!(suggested_name("op.27.no.2.png"), "op.27.no.2");
        assert_eq!(suggested_name("nocturne"), "nocturne");
        assert_eq!(suggested_name("trailing."), "trailing");
        assert_eq!(suggested_name(".hidden"), "");
    }

    #[test]
    fn change_event_tracks_attach_and_detach() {
        let mut attachment = FileAttachment::default();
        let attached = attachment.on_file_change(Some(SheetFile::new("sonata.pdf", vec![1u8])));
        assert_eq!(
            attached,
            AttachmentChanged {
                suggested_name: "sonata".to_string(),
                attached: true,
            }
        );
        assert_eq!(
            attachment.file().map(SheetFile::file_name),
            Some("sonata.pdf")
        );

        let detached = attachment.on_file_change(None);
        assert_eq!(detached.suggested_name, "");
        assert!(!detached.attached);
        assert!(attachment.file().is_none());
    }

    #[test]
    fn unsupported_types_are_still_attached() {
        let mut attachment = FileAttachment::default();
        let change = attachment.on_file_change(Some(SheetFile::new("notes.txt", Vec::<u8>::new())));
        assert!(change.attached);
        assert_eq!(attachment.suggested_name(), "notes");
    }
}
