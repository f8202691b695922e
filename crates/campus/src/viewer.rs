//! Links into the standalone glTF model viewer page.
//!
//! The page takes the floor's visual model in `param1` and its navigation
//! mesh in `param2`; both are file names resolved by the page itself.

pub fn visual_asset_name(building: &str, floor: i32) -> String {
    format!("{building}-{floor}F-cube.glb")
}

pub fn nav_asset_name(building: &str, floor: i32) -> String {
    format!("{building}-{floor}F-nav.glb")
}

pub fn model_viewer_url(page: &str, building: &str, floor: i32) -> String {
    format!(
        "{page}?param1={}&param2={}",
        encode_component(&visual_asset_name(building, floor)),
        encode_component(&nav_asset_name(building, floor)),
    )
}

/// Percent-encodes everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`, the
/// same set `encodeURIComponent` leaves alone.
pub fn encode_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
