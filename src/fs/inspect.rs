use std::fs;
use std::io::Read;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::config::{AppConfig, DEFAULT_ENCODINGS, DEFAULT_MAX_LINES, DEFAULT_MAX_TEXT_BYTES};
use crate::error::ReadError;

/// Number of leading bytes sampled when sniffing for binary content.
const SNIFF_BYTES: usize = 1024;

/// Language tag used when nothing more specific is known.
pub const PLAIN_TEXT: &str = "Plain Text";

/// Extensions that are always treated as text.
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "py", "js", "html", "css", "json", "xml", "yaml", "yml", "toml", "ini", "cfg",
    "conf", "log", "sh", "bash", "zsh", "fish", "ps1", "bat", "cmd", "c", "cpp", "h", "hpp",
    "java", "go", "rs", "php", "rb", "pl", "lua", "r", "sql", "csv", "tsv", "dockerfile",
    "gitignore", "gitattributes", "editorconfig",
];

/// Extensionless file names (lowercase) that are always treated as text.
const TEXT_NAMES: &[&str] = &[
    "readme",
    "license",
    "changelog",
    "makefile",
    "dockerfile",
    "requirements",
    "pipfile",
    "poetry",
    "setup",
    "manifest",
];

/// How a path should be presented in the preview pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Directory,
    TextFile,
    BinaryFile,
    Inaccessible,
}

/// Text encodings tried, in order, when decoding a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    /// Only accepted when the data starts with a byte-order mark.
    Utf16,
    /// Total: every byte sequence decodes.
    Latin1,
    Windows1252,
}

impl TextEncoding {
    /// Parse an encoding name as written in config files.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "utf-16" | "utf16" => Some(Self::Utf16),
            "latin-1" | "latin1" | "iso-8859-1" => Some(Self::Latin1),
            "windows-1252" | "cp1252" => Some(Self::Windows1252),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Utf16 => "UTF-16",
            Self::Latin1 => "Latin-1",
            Self::Windows1252 => "Windows-1252",
        }
    }

    /// Decode `bytes`, or `None` if they are not valid in this encoding.
    ///
    /// With `cut_short` set the input stops at a read limit, so a UTF-8 sequence
    /// or UTF-16 unit split by that limit is dropped instead of rejected.
    pub fn decode(&self, bytes: &[u8], cut_short: bool) -> Option<String> {
        match self {
            Self::Utf8 => {
                let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
                match std::str::from_utf8(bytes) {
                    Ok(text) => Some(text.to_owned()),
                    Err(e) if cut_short && e.error_len().is_none() => {
                        std::str::from_utf8(&bytes[..e.valid_up_to()])
                            .ok()
                            .map(str::to_owned)
                    }
                    Err(_) => None,
                }
            }
            Self::Utf16 => {
                let even = if cut_short {
                    &bytes[..bytes.len() - bytes.len() % 2]
                } else {
                    bytes
                };
                decode_utf16(even)
            }
            Self::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
            Self::Windows1252 => bytes.iter().map(|&b| windows_1252_char(b)).collect(),
        }
    }

    /// Bytes of `data` covering its first `max_lines` lines.
    ///
    /// UTF-16 newlines span two bytes, so that encoding always gets the whole buffer.
    fn line_prefix<'a>(&self, data: &'a [u8], max_lines: usize) -> &'a [u8] {
        if *self == Self::Utf16 {
            return data;
        }
        if max_lines == 0 {
            return &data[..0];
        }
        data.iter()
            .enumerate()
            .filter(|&(_, &b)| b == b'\n')
            .nth(max_lines - 1)
            .map_or(data, |(i, _)| &data[..=i])
    }
}

fn decode_utf16(bytes: &[u8]) -> Option<String> {
    let (body, little_endian) = if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        (rest, true)
    } else if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        (rest, false)
    } else {
        return None;
    };
    if body.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            if little_endian {
                u16::from_le_bytes([pair[0], pair[1]])
            } else {
                u16::from_be_bytes([pair[0], pair[1]])
            }
        })
        .collect();
    String::from_utf16(&units).ok()
}

/// Windows-1252 differs from Latin-1 only in 0x80..=0x9F; five of those are unassigned.
fn windows_1252_char(byte: u8) -> Option<char> {
    const HIGH: [Option<char>; 32] = [
        Some('\u{20AC}'),
        None,
        Some('\u{201A}'),
        Some('\u{0192}'),
        Some('\u{201E}'),
        Some('\u{2026}'),
        Some('\u{2020}'),
        Some('\u{2021}'),
        Some('\u{02C6}'),
        Some('\u{2030}'),
        Some('\u{0160}'),
        Some('\u{2039}'),
        Some('\u{0152}'),
        None,
        Some('\u{017D}'),
        None,
        None,
        Some('\u{2018}'),
        Some('\u{2019}'),
        Some('\u{201C}'),
        Some('\u{201D}'),
        Some('\u{2022}'),
        Some('\u{2013}'),
        Some('\u{2014}'),
        Some('\u{02DC}'),
        Some('\u{2122}'),
        Some('\u{0161}'),
        Some('\u{203A}'),
        Some('\u{0153}'),
        None,
        Some('\u{017E}'),
        Some('\u{0178}'),
    ];
    match byte {
        0x80..=0x9F => HIGH[(byte - 0x80) as usize],
        _ => Some(byte as char),
    }
}

/// Successfully decoded preview text.
#[derive(Debug, Clone)]
pub struct DecodedText {
    /// Content, at most `max_lines` lines plus one truncation marker line.
    pub text: String,
    pub encoding: TextEncoding,
    pub truncated: bool,
}

/// Kind of object as reported by [`FileMetadata`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaKind {
    Directory,
    File,
    Unknown,
}

impl MetaKind {
    pub fn label(&self) -> &'static str {
        match self {
            MetaKind::Directory => "directory",
            MetaKind::File => "file",
            MetaKind::Unknown => "unknown",
        }
    }
}

/// Best-effort metadata; `None` fields could not be read.
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub size: Option<u64>,
    pub permissions: Option<String>,
    pub modified: Option<SystemTime>,
    pub kind: MetaKind,
}

impl FileMetadata {
    pub const UNKNOWN: &'static str = "Unknown";

    pub fn size_label(&self) -> String {
        self.size
            .map(format_size)
            .unwrap_or_else(|| Self::UNKNOWN.to_string())
    }

    pub fn permissions_label(&self) -> &str {
        self.permissions.as_deref().unwrap_or(Self::UNKNOWN)
    }

    pub fn modified_label(&self) -> String {
        self.modified
            .and_then(format_timestamp)
            .unwrap_or_else(|| Self::UNKNOWN.to_string())
    }
}

/// Rendered content of the preview pane, independent of styling.
#[derive(Debug, Clone)]
pub enum PreviewBody {
    Text {
        content: DecodedText,
        language: &'static str,
    },
    Binary {
        media_type: Option<&'static str>,
    },
    Directory,
    Unreadable(String),
    Inaccessible,
}

/// Everything the preview pane needs for one file.
#[derive(Debug, Clone)]
pub struct Preview {
    pub path: PathBuf,
    pub metadata: FileMetadata,
    pub body: PreviewBody,
}

/// Text/binary classification, bounded reads and language detection.
#[derive(Debug, Clone)]
pub struct FileInspector {
    max_text_bytes: u64,
    max_lines: usize,
    encodings: Vec<TextEncoding>,
}

impl Default for FileInspector {
    fn default() -> Self {
        Self {
            max_text_bytes: DEFAULT_MAX_TEXT_BYTES,
            max_lines: DEFAULT_MAX_LINES,
            encodings: DEFAULT_ENCODINGS
                .iter()
                .filter_map(|n| TextEncoding::from_name(n))
                .collect(),
        }
    }
}

impl FileInspector {
    pub fn new(max_text_bytes: u64, max_lines: usize, encodings: Vec<TextEncoding>) -> Self {
        Self {
            max_text_bytes,
            max_lines,
            encodings,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let encodings = config
            .encodings()
            .iter()
            .filter_map(|name| {
                let enc = TextEncoding::from_name(name);
                if enc.is_none() {
                    debug!(encoding = %name, "skipping unknown encoding");
                }
                enc
            })
            .collect();
        Self::new(config.max_text_bytes(), config.max_lines(), encodings)
    }

    /// Decide whether `path` can be previewed as text.
    pub fn classify(&self, path: &Path) -> FileClass {
        let meta = match fs::metadata(path) {
            Ok(m) => m,
            Err(_) => return FileClass::Inaccessible,
        };
        if meta.is_dir() {
            return FileClass::Directory;
        }
        if !meta.is_file() || meta.len() > self.max_text_bytes {
            return FileClass::BinaryFile;
        }

        let sample = match read_sample(path) {
            Ok(s) => s,
            Err(_) => return FileClass::Inaccessible,
        };
        if sample.contains(&0) {
            return FileClass::BinaryFile;
        }

        if guess_media_type(path).is_some_and(|m| m.starts_with("text/"))
            || has_text_extension(path)
            || has_text_name(path)
            || is_utf8_prefix(&sample)
        {
            FileClass::TextFile
        } else {
            FileClass::BinaryFile
        }
    }

    /// Read and decode `path`, keeping at most `max_lines` lines.
    ///
    /// When the limit is hit a single marker line is appended.
    pub fn read_preview(&self, path: &Path, max_lines: usize) -> Result<DecodedText, ReadError> {
        let mut data = Vec::new();
        fs::File::open(path)?
            .take(self.max_text_bytes.saturating_add(1))
            .read_to_end(&mut data)?;
        let capped = data.len() as u64 > self.max_text_bytes;
        if capped {
            data.truncate(self.max_text_bytes as usize);
        }

        // Encodings are judged on the shown lines only.
        let (decoded, encoding, cut) = self
            .encodings
            .iter()
            .find_map(|enc| {
                let head = enc.line_prefix(&data, max_lines);
                let cut = head.len() < data.len();
                enc.decode(head, capped && !cut)
                    .map(|text| (text, *enc, cut))
            })
            .ok_or(ReadError::Undecodable)?;

        let mut lines = decoded.lines();
        let kept: Vec<&str> = lines.by_ref().take(max_lines).collect();
        let truncated = capped || cut || lines.next().is_some();
        if capped {
            debug!(path = %path.display(), limit = self.max_text_bytes, "preview read hit byte limit");
        }

        let mut text = kept.join("\n");
        if truncated {
            text.push('\n');
            if capped && kept.len() < max_lines {
                text.push_str(&format!(
                    "... (truncated after {})",
                    format_size(self.max_text_bytes)
                ));
            } else {
                text.push_str(&truncation_marker(max_lines));
            }
        }
        Ok(DecodedText {
            text,
            encoding,
            truncated,
        })
    }

    /// Best-effort metadata; unreadable fields are left as `None`.
    pub fn describe(&self, path: &Path) -> FileMetadata {
        match fs::metadata(path) {
            Ok(meta) => {
                let kind = if meta.is_dir() {
                    MetaKind::Directory
                } else {
                    MetaKind::File
                };
                FileMetadata {
                    size: Some(meta.len()),
                    permissions: Some(format_mode(meta.permissions().mode())),
                    modified: meta.modified().ok(),
                    kind,
                }
            }
            Err(_) => FileMetadata {
                size: None,
                permissions: None,
                modified: None,
                kind: MetaKind::Unknown,
            },
        }
    }

    /// Build the full preview for `path`.
    pub fn preview(&self, path: &Path) -> Preview {
        let metadata = self.describe(path);
        let body = match self.classify(path) {
            FileClass::Directory => PreviewBody::Directory,
            FileClass::Inaccessible => PreviewBody::Inaccessible,
            FileClass::BinaryFile => PreviewBody::Binary {
                media_type: guess_media_type(path),
            },
            FileClass::TextFile => match self.read_preview(path, self.max_lines) {
                Ok(content) => {
                    let mut language = language_tag(path);
                    if language == PLAIN_TEXT {
                        if let Some(first) = content.text.lines().next() {
                            language = shebang_language(first).unwrap_or(PLAIN_TEXT);
                        }
                    }
                    PreviewBody::Text { content, language }
                }
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "preview read failed");
                    PreviewBody::Unreadable(e.to_string())
                }
            },
        };
        Preview {
            path: path.to_path_buf(),
            metadata,
            body,
        }
    }
}

/// Marker line appended to truncated previews.
pub fn truncation_marker(max_lines: usize) -> String {
    format!("... (truncated after {} lines)", max_lines)
}

fn read_sample(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = fs::File::open(path)?;
    let mut sample = Vec::with_capacity(SNIFF_BYTES);
    file.take(SNIFF_BYTES as u64).read_to_end(&mut sample)?;
    Ok(sample)
}

/// Valid UTF-8, allowing a multi-byte sequence cut off by the sample boundary.
fn is_utf8_prefix(sample: &[u8]) -> bool {
    match std::str::from_utf8(sample) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    }
}

fn lower_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn has_text_extension(path: &Path) -> bool {
    // `.gitignore` has no extension as far as `Path` is concerned.
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let dotfile_ext = name.strip_prefix('.');
    lower_extension(path)
        .as_deref()
        .or(dotfile_ext)
        .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext))
}

fn has_text_name(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|name| TEXT_NAMES.contains(&name.as_str()))
}

/// Media type guessed from the file extension.
pub fn guess_media_type(path: &Path) -> Option<&'static str> {
    let ext = lower_extension(path)?;
    let media = match ext.as_str() {
        "txt" | "text" | "log" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "tsv" => "text/tab-separated-values",
        "js" | "mjs" => "text/javascript",
        "py" => "text/x-python",
        "c" | "h" => "text/x-c",
        "xml" => "application/xml",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "wasm" => "application/wasm",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/vnd.microsoft.icon",
        "mp3" => "audio/mpeg",
        "wav" => "audio/x-wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => return None,
    };
    Some(media)
}

/// Highlighting language for `path`, from its extension or well-known name.
///
/// Tags are syntect syntax names where syntect ships one.
pub fn language_tag(path: &Path) -> &'static str {
    if let Some(ext) = lower_extension(path) {
        let tag = match ext.as_str() {
            "py" | "pyw" | "ipynb" => "Python",
            "js" | "jsx" | "mjs" => "JavaScript",
            "ts" | "tsx" => "TypeScript",
            "html" | "htm" => "HTML",
            "css" => "CSS",
            "json" => "JSON",
            "xml" => "XML",
            "yaml" | "yml" => "YAML",
            "toml" => "TOML",
            "ini" | "cfg" | "conf" => "INI",
            "sh" | "bash" | "zsh" => "Bourne Again Shell (bash)",
            "fish" => "Fish",
            "ps1" => "PowerShell",
            "bat" | "cmd" => "Batch File",
            "c" | "h" => "C",
            "cpp" | "cc" | "cxx" | "hpp" => "C++",
            "java" => "Java",
            "go" => "Go",
            "rs" => "Rust",
            "php" => "PHP",
            "rb" => "Ruby",
            "pl" => "Perl",
            "lua" => "Lua",
            "r" => "R",
            "sql" => "SQL",
            "md" | "markdown" => "Markdown",
            "dockerfile" => "Dockerfile",
            _ => PLAIN_TEXT,
        };
        return tag;
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match name.as_str() {
        "dockerfile" => "Dockerfile",
        "makefile" => "Makefile",
        "readme" | "changelog" => "Markdown",
        _ => PLAIN_TEXT,
    }
}

/// Language named by a `#!` interpreter line.
pub fn shebang_language(first_line: &str) -> Option<&'static str> {
    if !first_line.starts_with("#!") {
        return None;
    }
    let line = first_line.to_lowercase();
    if line.contains("python") {
        Some("Python")
    } else if line.contains("bash") || line.contains("/sh") || line.contains("zsh") {
        Some("Bourne Again Shell (bash)")
    } else if line.contains("ruby") {
        Some("Ruby")
    } else if line.contains("node") || line.contains("deno") {
        Some("JavaScript")
    } else if line.contains("perl") {
        Some("Perl")
    } else {
        None
    }
}

/// Format bytes into human-readable size string.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Compact size used in tree labels, e.g. `12KB`.
pub fn format_size_compact(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{}B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{}KB", bytes / 1024)
    } else {
        format!("{}MB", bytes / (1024 * 1024))
    }
}

/// Format a Unix mode as `drwxr-xr-x`.
fn format_mode(mode: u32) -> String {
    let mut s = String::with_capacity(10);
    s.push(match mode & 0o170000 {
        0o040000 => 'd',
        0o120000 => 'l',
        0o020000 => 'c',
        0o060000 => 'b',
        0o010000 => 'p',
        0o140000 => 's',
        _ => '-',
    });
    let flags = [
        (0o400, 'r'),
        (0o200, 'w'),
        (0o100, 'x'),
        (0o040, 'r'),
        (0o020, 'w'),
        (0o010, 'x'),
        (0o004, 'r'),
        (0o002, 'w'),
        (0o001, 'x'),
    ];
    for (bit, ch) in flags {
        s.push(if mode & bit != 0 { ch } else { '-' });
    }
    s
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS` (UTC).
fn format_timestamp(time: SystemTime) -> Option<String> {
    let secs = time.duration_since(UNIX_EPOCH).ok()?.as_secs();
    let days = secs / 86400;
    let remaining = secs % 86400;
    let (year, month, day) = epoch_days_to_date(days);
    Some(format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        year,
        month,
        day,
        remaining / 3600,
        (remaining % 3600) / 60,
        remaining % 60
    ))
}

/// Convert days since Unix epoch to (year, month, day).
fn epoch_days_to_date(days: u64) -> (u64, u64, u64) {
    let mut remaining = days;
    let mut year = 1970u64;

    loop {
        let days_in_year = if is_leap_year(year) { 366 } else { 365 };
        if remaining < days_in_year {
            break;
        }
        remaining -= days_in_year;
        year += 1;
    }

    let days_in_months: [u64; 12] = if is_leap_year(year) {
        [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    } else {
        [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    };

    let mut month = 1u64;
    for &dm in &days_in_months {
        if remaining < dm {
            break;
        }
        remaining -= dm;
        month += 1;
    }

    (year, month, remaining + 1)
}

fn is_leap_year(year: u64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        File::create(&path).unwrap().write_all(bytes).unwrap();
        path
    }

    #[test]
    fn classify_python_source_as_text() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "main.py", b"print('hello')\n");
        assert_eq!(FileInspector::default().classify(&path), FileClass::TextFile);
    }

    #[test]
    fn classify_null_byte_is_binary_regardless_of_extension() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "sneaky.py", b"print(1)\x00\x01\x02");
        assert_eq!(
            FileInspector::default().classify(&path),
            FileClass::BinaryFile
        );
    }

    #[test]
    fn classify_unknown_extension_sniffs_utf8() {
        let dir = TempDir::new().unwrap();
        let text = write(&dir, "notes.weird", "héllo wörld".as_bytes());
        let junk = write(&dir, "blob.weird", &[0xC3, 0x28, 0xA0, 0xA1]);
        let inspector = FileInspector::default();
        assert_eq!(inspector.classify(&text), FileClass::TextFile);
        assert_eq!(inspector.classify(&junk), FileClass::BinaryFile);
    }

    #[test]
    fn classify_utf8_cut_at_sample_boundary_is_text() {
        let dir = TempDir::new().unwrap();
        let mut bytes = vec![b'a'; SNIFF_BYTES - 1];
        bytes.extend_from_slice("é".as_bytes());
        let path = write(&dir, "edge.unknown", &bytes);
        assert_eq!(FileInspector::default().classify(&path), FileClass::TextFile);
    }

    #[test]
    fn classify_known_extensionless_name() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "Makefile", &[b'a', 0xFF, 0xFE, b'b']);
        assert_eq!(FileInspector::default().classify(&path), FileClass::TextFile);
    }

    #[test]
    fn classify_oversized_file_is_binary() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "big.txt", &[b'x'; 64]);
        let inspector = FileInspector::new(32, 1000, vec![TextEncoding::Utf8]);
        assert_eq!(inspector.classify(&path), FileClass::BinaryFile);
    }

    #[test]
    fn classify_directory_and_missing() {
        let dir = TempDir::new().unwrap();
        let inspector = FileInspector::default();
        assert_eq!(inspector.classify(dir.path()), FileClass::Directory);
        assert_eq!(
            inspector.classify(&dir.path().join("missing")),
            FileClass::Inaccessible
        );
    }

    #[test]
    fn read_preview_truncates_long_files() {
        let dir = TempDir::new().unwrap();
        let content: String = (1..=1500).map(|i| format!("line {i}\n")).collect();
        let path = write(&dir, "long.txt", content.as_bytes());

        let decoded = FileInspector::default()
            .read_preview(&path, 1000)
            .unwrap();
        assert!(decoded.truncated);
        let lines: Vec<&str> = decoded.text.lines().collect();
        assert_eq!(lines.len(), 1001);
        assert_eq!(lines[999], "line 1000");
        assert_eq!(lines[1000], truncation_marker(1000));
    }

    #[test]
    fn read_preview_decodes_only_shown_lines() {
        let dir = TempDir::new().unwrap();
        let mut content: Vec<u8> = (0..3000)
            .flat_map(|i| format!("café {i}\n").into_bytes())
            .collect();
        content.push(0xFF);
        let path = write(&dir, "menu.txt", &content);

        let decoded = FileInspector::default().read_preview(&path, 1000).unwrap();
        assert_eq!(decoded.encoding, TextEncoding::Utf8);
        assert!(decoded.truncated);
        let lines: Vec<&str> = decoded.text.lines().collect();
        assert_eq!(lines[0], "café 0");
        assert_eq!(lines[999], "café 999");
        assert_eq!(lines[1000], truncation_marker(1000));
    }

    #[test]
    fn read_preview_stops_at_byte_limit() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "wide.txt", "é".repeat(50).as_bytes());
        // 63 bytes splits the 32nd two-byte character.
        let inspector = FileInspector::new(
            63,
            1000,
            vec![TextEncoding::Utf8, TextEncoding::Latin1],
        );
        let decoded = inspector.read_preview(&path, 1000).unwrap();
        assert_eq!(decoded.encoding, TextEncoding::Utf8);
        assert!(decoded.truncated);
        let lines: Vec<&str> = decoded.text.lines().collect();
        assert_eq!(lines, vec!["é".repeat(31).as_str(), "... (truncated after 63 B)"]);
    }

    #[test]
    fn read_preview_exact_limit_is_not_truncated() {
        let dir = TempDir::new().unwrap();
        let content: String = (1..=10).map(|i| format!("{i}\n")).collect();
        let path = write(&dir, "ten.txt", content.as_bytes());
        let decoded = FileInspector::default().read_preview(&path, 10).unwrap();
        assert!(!decoded.truncated);
        assert_eq!(decoded.text.lines().count(), 10);
    }

    #[test]
    fn read_preview_falls_back_through_encodings() {
        let dir = TempDir::new().unwrap();
        let latin = write(&dir, "latin.txt", &[b'c', b'a', b'f', 0xE9]);
        let decoded = FileInspector::default().read_preview(&latin, 10).unwrap();
        assert_eq!(decoded.encoding, TextEncoding::Latin1);
        assert_eq!(decoded.text, "café");

        let utf16 = write(&dir, "wide.txt", &[0xFF, 0xFE, b'h', 0, b'i', 0]);
        let decoded = FileInspector::default().read_preview(&utf16, 10).unwrap();
        assert_eq!(decoded.encoding, TextEncoding::Utf16);
        assert_eq!(decoded.text, "hi");
    }

    #[test]
    fn read_preview_windows_1252_when_configured() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "quote.txt", &[0x93, b'h', b'i', 0x94]);
        let inspector = FileInspector::new(
            1024,
            10,
            vec![TextEncoding::Utf8, TextEncoding::Windows1252],
        );
        let decoded = inspector.read_preview(&path, 10).unwrap();
        assert_eq!(decoded.encoding, TextEncoding::Windows1252);
        assert_eq!(decoded.text, "\u{201C}hi\u{201D}");
    }

    #[test]
    fn read_preview_undecodable_and_missing() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.txt", &[0x81, 0xFF]);
        let inspector = FileInspector::new(
            1024,
            10,
            vec![TextEncoding::Utf8, TextEncoding::Windows1252],
        );
        assert!(matches!(
            inspector.read_preview(&path, 10),
            Err(ReadError::Undecodable)
        ));
        assert!(matches!(
            inspector.read_preview(&dir.path().join("missing"), 10),
            Err(ReadError::Io(_))
        ));
    }

    #[test]
    fn encoding_names_parse() {
        assert_eq!(TextEncoding::from_name("UTF-8"), Some(TextEncoding::Utf8));
        assert_eq!(TextEncoding::from_name("cp1252"), Some(TextEncoding::Windows1252));
        assert_eq!(TextEncoding::from_name("latin_1"), Some(TextEncoding::Latin1));
        assert_eq!(TextEncoding::from_name("ebcdic"), None);
    }

    #[test]
    fn language_tags() {
        assert_eq!(language_tag(Path::new("a.py")), "Python");
        assert_eq!(language_tag(Path::new("A.RS")), "Rust");
        assert_eq!(language_tag(Path::new("Dockerfile")), "Dockerfile");
        assert_eq!(language_tag(Path::new("README")), "Markdown");
        assert_eq!(language_tag(Path::new("data.xyz")), PLAIN_TEXT);
        assert_eq!(language_tag(Path::new("noext")), PLAIN_TEXT);
    }

    #[test]
    fn shebang_detection() {
        assert_eq!(shebang_language("#!/usr/bin/env python3"), Some("Python"));
        assert_eq!(
            shebang_language("#!/bin/sh"),
            Some("Bourne Again Shell (bash)")
        );
        assert_eq!(shebang_language("echo hi"), None);
    }

    #[test]
    fn preview_uses_shebang_for_plain_files() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "run", b"#!/usr/bin/env python\nprint(1)\n");
        let preview = FileInspector::default().preview(&path);
        match preview.body {
            PreviewBody::Text { language, .. } => assert_eq!(language, "Python"),
            other => panic!("expected text preview, got {other:?}"),
        }
    }

    #[test]
    fn preview_binary_reports_media_type() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "pic.png", &[0x89, b'P', b'N', b'G', 0, 0]);
        let preview = FileInspector::default().preview(&path);
        assert!(matches!(
            preview.body,
            PreviewBody::Binary {
                media_type: Some("image/png")
            }
        ));
    }

    #[test]
    fn describe_reports_fields() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "f.txt", b"12345");
        let meta = FileInspector::default().describe(&path);
        assert_eq!(meta.size, Some(5));
        assert_eq!(meta.kind, MetaKind::File);
        assert_eq!(meta.permissions_label().len(), 10);
        assert!(meta.permissions_label().starts_with('-'));
        assert_ne!(meta.modified_label(), FileMetadata::UNKNOWN);
    }

    #[test]
    fn describe_missing_uses_unknown_sentinel() {
        let meta = FileInspector::default().describe(Path::new("/definitely/not/here"));
        assert_eq!(meta.kind, MetaKind::Unknown);
        assert_eq!(meta.size_label(), FileMetadata::UNKNOWN);
        assert_eq!(meta.permissions_label(), FileMetadata::UNKNOWN);
        assert_eq!(meta.modified_label(), FileMetadata::UNKNOWN);
    }

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1_048_576), "1.0 MB");
        assert_eq!(format_size_compact(2048), "2KB");
        assert_eq!(format_size_compact(10), "10B");
    }

    #[test]
    fn format_mode_string() {
        assert_eq!(format_mode(0o040755), "drwxr-xr-x");
        assert_eq!(format_mode(0o100644), "-rw-r--r--");
    }

    #[test]
    fn timestamp_formatting() {
        let t = UNIX_EPOCH + Duration::from_secs(86400 * 366 + 3661);
        assert_eq!(format_timestamp(t).unwrap(), "1971-01-02 01:01:01");
    }
}
