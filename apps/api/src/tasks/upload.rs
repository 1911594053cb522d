use bytes::Bytes;
use thiserror::Error;

use crate::config::Config;

pub const ALLOWED_EXTENSIONS: [&str; 7] = ["pdf", "doc", "docx", "txt", "jpg", "jpeg", "png"];

#[derive(Debug, Error, PartialEq)]
pub enum UploadError {
    #[error("'{filename}' has an unsupported format (allowed: pdf, doc, docx, txt, jpg, jpeg, png)")]
    UnsupportedFormat { filename: String },

    #[error("'{filename}' exceeds the {limit_bytes} byte upload limit")]
    FileTooLarge { filename: String, limit_bytes: usize },

    #[error("'{filename}' is empty")]
    EmptyFile { filename: String },

    #[error("No files were uploaded")]
    NoFiles,

    #[error("{count} files uploaded, at most {limit} are allowed per task")]
    TooManyFiles { count: usize, limit: usize },

    #[error("Recognition type 'target' requires a target position")]
    MissingTargetPosition,
}

impl UploadError {
    pub fn code(&self) -> &'static str {
        match self {
            UploadError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            UploadError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            UploadError::EmptyFile { .. } => "EMPTY_FILE",
            UploadError::NoFiles => "NO_FILES",
            UploadError::TooManyFiles { .. } => "TOO_MANY_FILES",
            UploadError::MissingTargetPosition => "MISSING_TARGET_POSITION",
        }
    }
}

/// One file part of an upload request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// Lower-cased extension, if the name has one.
fn extension_of(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_file_bytes: usize,
    pub max_files: usize,
}

impl UploadPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_file_bytes: config.max_upload_bytes,
            max_files: config.max_files_per_task,
        }
    }

    pub fn check_format(&self, filename: &str) -> Result<(), UploadError> {
        let supported = extension_of(filename)
            .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()));
        if !supported {
            return Err(UploadError::UnsupportedFormat {
                filename: filename.to_string(),
            });
        }
        Ok(())
    }

    /// Called with the running byte count while a part is still streaming.
    pub fn check_size(&self, filename: &str, len: usize) -> Result<(), UploadError> {
        if len > self.max_file_bytes {
            return Err(UploadError::FileTooLarge {
                filename: filename.to_string(),
                limit_bytes: self.max_file_bytes,
            });
        }
        Ok(())
    }

    /// Format first, then size, then emptiness.
    pub fn check_file(&self, file: &UploadedFile) -> Result<(), UploadError> {
        self.check_format(&file.filename)?;
        self.check_size(&file.filename, file.content.len())?;
        if file.content.is_empty() {
            return Err(UploadError::EmptyFile {
                filename: file.filename.clone(),
            });
        }
        Ok(())
    }

    /// Rejects the whole batch on its first bad file.
    pub fn check_batch(&self, files: &[UploadedFile]) -> Result<(), UploadError> {
        if files.is_empty() {
            return Err(UploadError::NoFiles);
        }
        if files.len() > self.max_files {
            return Err(UploadError::TooManyFiles {
                count: files.len(),
                limit: self.max_files,
            });
        }
        files.iter().try_for_each(|f| self.check_file(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> UploadPolicy {
        UploadPolicy {
            max_file_bytes: 8,
            max_files: 3,
        }
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert!(policy().check_file(&UploadedFile::new("张三.PDF", "abc")).is_ok());
        assert!(policy().check_file(&UploadedFile::new("scan.JpEg", "abc")).is_ok());
    }

    #[test]
    fn test_unsupported_formats() {
        for name in ["virus.exe", "README", ".pdf", "notes."] {
            let err = policy().check_file(&UploadedFile::new(name, "abc")).unwrap_err();
            assert_eq!(err.code(), "UNSUPPORTED_FORMAT", "{name}");
        }
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        assert!(policy().check_file(&UploadedFile::new("a.txt", "12345678")).is_ok());
        assert_eq!(
            policy().check_file(&UploadedFile::new("a.txt", "123456789")),
            Err(UploadError::FileTooLarge {
                filename: "a.txt".to_string(),
                limit_bytes: 8
            })
        );
    }

    #[test]
    fn test_running_size_check() {
        let policy = policy();
        assert!(policy.check_size("scan.png", 8).is_ok());
        assert_eq!(policy.check_size("scan.png", 9).unwrap_err().code(), "FILE_TOO_LARGE");
        assert_eq!(policy.check_format("scan.gif").unwrap_err().code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_empty_file_rejected() {
        assert_eq!(
            policy().check_file(&UploadedFile::new("空文件.txt", "")),
            Err(UploadError::EmptyFile {
                filename: "空文件.txt".to_string()
            })
        );
    }

    #[test]
    fn test_batch_rules() {
        assert_eq!(policy().check_batch(&[]), Err(UploadError::NoFiles));

        let many = vec![UploadedFile::new("a.pdf", "x"); 4];
        assert_eq!(
            policy().check_batch(&many),
            Err(UploadError::TooManyFiles { count: 4, limit: 3 })
        );

        let mixed = vec![
            UploadedFile::new("a.pdf", "x"),
            UploadedFile::new("b.exe", "x"),
            UploadedFile::new("c.pdf", ""),
        ];
        assert_eq!(policy().check_batch(&mixed).unwrap_err().code(), "UNSUPPORTED_FORMAT");
    }
}
