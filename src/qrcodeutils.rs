use crate::chain::utils::{parse_wei_digits, shm_to_wei, wei_to_shm};
use crate::entity::{PayLinkError, QrPaymentData};
use crate::utils::validate_address;
use anyhow::{anyhow, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use qrcode::{render::svg, EcLevel, QrCode};
use resvg::render;
use tiny_skia::Pixmap;
use url::Url;
use usvg::{Options, Tree};

const URI_SCHEME: &str = "ethereum:";
pub const QR_DARK_COLOR: &str = "#164e63";
pub const QR_LIGHT_COLOR: &str = "#ffffff";
pub const QR_SIZE: u32 = 300;

// Everything but the marks a URI component may carry unescaped
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Payload for a receive QR code.
///
/// Without a positive amount the payload is the bare address; otherwise
/// `ethereum:<address>?value=<wei>[&message=<note>]`.
pub fn build_payment_uri(address: &str, amount: Option<f64>, note: Option<&str>) -> Result<String> {
    if !validate_address(address) {
        return Err(PayLinkError::InvalidAddress.into());
    }

    let amount = match amount {
        Some(amount) if amount > 0.0 => amount,
        _ => return Ok(address.to_string()),
    };

    let mut uri = format!("{}{}?value={}", URI_SCHEME, address, shm_to_wei(amount)?);
    if let Some(note) = note.filter(|n| !n.is_empty()) {
        uri.push_str("&message=");
        uri.extend(utf8_percent_encode(note, URI_COMPONENT));
    }

    Ok(uri)
}

/// Decode a scanned payload. Anything that is neither a payment URI nor a
/// bare address yields `None`.
pub fn parse_payment_payload(data: &str) -> Option<QrPaymentData> {
    let data = data.trim();

    if data.starts_with(URI_SCHEME) {
        let uri = Url::parse(data).ok()?;
        let address = uri.path();
        if !validate_address(address) {
            return None;
        }

        let mut amount = None;
        let mut note = None;
        for (key, value) in uri.query_pairs() {
            match key.as_ref() {
                "value" => amount = parse_wei_digits(&value).map(wei_to_shm),
                "message" if !value.is_empty() => note = Some(value.into_owned()),
                _ => {}
            }
        }

        return Some(QrPaymentData {
            address: address.to_string(),
            amount,
            note,
        });
    }

    if validate_address(data) {
        return Some(QrPaymentData {
            address: data.to_string(),
            amount: None,
            note: None,
        });
    }

    None
}

/// Render a payload as an SVG QR code
pub fn generate_qr_svg(payload: &str) -> Result<String> {
    let code = QrCode::with_error_correction_level(payload, EcLevel::M)
        .map_err(|e| anyhow!("Failed to generate QR code: {}", e))?;

    Ok(code
        .render()
        .min_dimensions(QR_SIZE, QR_SIZE)
        .dark_color(svg::Color(QR_DARK_COLOR))
        .light_color(svg::Color(QR_LIGHT_COLOR))
        .build())
}

/// Render a payload as a PNG QR code
pub fn generate_qr_png(payload: &str) -> Result<Vec<u8>> {
    let svg = generate_qr_svg(payload)?;
    convert_svg_to_png(svg.as_bytes())
}

/// Rasterise SVG bytes to PNG.
pub fn convert_svg_to_png(svg_data: &[u8]) -> Result<Vec<u8>> {
    let tree = Tree::from_data(svg_data, &Options::default())
        .map_err(|e| anyhow!("Error parsing SVG: {}", e))?;

    let size = tree.size();
    let (width, height) = (size.width().ceil() as u32, size.height().ceil() as u32);

    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| anyhow!("Failed to create Pixmap"))?;
    render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(pixmap.data())?;
    }

    Ok(png_data)
}
