/// Capacity of the queue between the file enumerator and the workers.
pub const QUEUE_CAPACITY: usize = 100;

/// Prefix of the artifact written next to each original file.
pub const COMPRESSED_PREFIX: &str = "compressed_";

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;
pub const MAX_IMAGE_DIMENSION: u32 = 2000;
pub const JPEG_QUALITY: u8 = 85;

pub const OXIPNG_PRESET: u8 = 4;
pub const LIBDEFLATER_LEVEL: u8 = 12;

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {pos} files {msg}";

pub const IMAGE_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/bmp",
    "image/tiff",
    "image/webp",
];

pub const PDF_CONTENT_TYPES: &[&str] = &["application/pdf"];

/// Extension fallback used when content sniffing is inconclusive.
pub const EXTENSION_CONTENT_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("webp", "image/webp"),
    ("pdf", "application/pdf"),
    ("txt", "text/plain"),
    ("log", "text/plain"),
    ("csv", "text/csv"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("js", "text/javascript"),
    ("json", "application/json"),
    ("xml", "application/xml"),
];
