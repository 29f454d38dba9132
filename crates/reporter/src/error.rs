use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render chart '{title}': {reason}")]
    Chart { title: String, reason: String },

    #[error("Failed to encode chart image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to build PDF report: {0}")]
    Pdf(String),

    #[error("Failed to build workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("Nothing to report: {0}")]
    Empty(String),
}
