//! Output artifact naming

const FALLBACK_STEM: &str = "image";
const AVIF_EXTENSION: &str = "avif";

/// Derive the AVIF file name for an uploaded file name.
///
/// Directory components (either separator) and the last extension are stripped, then
/// `.avif` is appended. Names with nothing left fall back to `image.avif`.
pub fn output_file_name(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();

    let stem = match base.rfind('.') {
        Some(0) | None => base,
        Some(idx) => &base[..idx],
    };

    let stem = stem.trim();
    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        return format!("{}.{}", FALLBACK_STEM, AVIF_EXTENSION);
    }

    format!("{}.{}", stem, AVIF_EXTENSION)
}
