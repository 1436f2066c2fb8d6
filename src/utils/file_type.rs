/// Coarse upload category, decided by extension only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Archive,
    Unknown,
}

impl FileType {
    pub fn detect(filename: &str) -> Self {
        match extension(filename).to_lowercase().as_str() {
            ".pdf" => FileType::Pdf,
            ".zip" | ".tar" | ".gz" | ".rar" | ".7z" => FileType::Archive,
            _ => FileType::Unknown,
        }
    }
}

/// Suffix from the last '.' of the final path element, dot included.
/// Returns "" when there is none.
pub fn extension(filename: &str) -> &str {
    let base = base_name(filename);
    base.rfind('.').map(|i| &base[i..]).unwrap_or("")
}

/// Final path element, accepting both separators since browsers on
/// Windows may send the full client path.
pub fn base_name(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
}
