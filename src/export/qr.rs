//! QR renderer
//!
//! Encodes a compact JSON summary of a result, never the full report. The
//! payload is checked against the configured byte cap before encoding, and
//! the encoder's own capacity limit is reported the same way.

use crate::error::ExportError;
use crate::models::{DiagnosticKind, DiagnosticResult};
use image::{GrayImage, ImageFormat, Luma};
use qrcode::types::QrError;
use qrcode::{Color, EcLevel, QrCode};
use serde_json::{json, Map, Value};
use std::io::Cursor;

use super::ExportOptions;

/// Byte-mode capacity of a version 40 symbol at level H
pub const MAX_PAYLOAD_BYTES: usize = 1273;
pub const DEFAULT_IMAGE_SIZE: u32 = 512;
/// Light border around the symbol, in modules
pub const QUIET_ZONE: u32 = 4;

/// Compact JSON summary encoded into the symbol
pub fn qr_payload(result: &DiagnosticResult) -> Result<String, ExportError> {
    let kind = result.kind();
    let ts = result.timestamp().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    let value = match result {
        DiagnosticResult::HealthCheck(r) => {
            let mut checks = Map::new();
            for check in &r.checks {
                checks.insert(check.name.clone(), json!(check.score));
            }
            json!({
                "kind": kind.slug(),
                "ts": ts,
                "score": r.overall_score,
                "status": r.overall_status.as_str(),
                "checks": Value::Object(checks),
            })
        }
        DiagnosticResult::Performance(r) => {
            let mut categories = Map::new();
            for c in &r.category_scores {
                categories.insert(c.category.label().to_string(), json!(c.score));
            }
            let mut value = json!({
                "kind": kind.slug(),
                "ts": ts,
                "score": r.overall_score,
                "grade": r.grade.label(),
                "categories": Value::Object(categories),
            });
            if let (Some(ranking), Some(obj)) = (&r.device_ranking, value.as_object_mut()) {
                obj.insert("rank".to_string(), json!(ranking.global_rank));
                obj.insert("of".to_string(), json!(ranking.total_devices));
            }
            value
        }
        DiagnosticResult::Comparison(r) => {
            let overall = &r.overall_comparison;
            json!({
                "kind": kind.slug(),
                "ts": ts,
                "device": r.current_device.device_name,
                "rank": overall.overall_ranking,
                "of": overall.total_devices,
                "percentile": (overall.percentile * 10.0).round() / 10.0,
                "strengths": overall.strengths.len(),
                "weaknesses": overall.weaknesses.len(),
            })
        }
    };

    Ok(serde_json::to_string(&value)?)
}

/// Encode `payload` at level H, failing on anything over `capacity` bytes.
pub fn encode(payload: &str, capacity: usize) -> Result<QrCode, ExportError> {
    let len = payload.len();
    if len > capacity {
        return Err(ExportError::CapacityExceeded { len, capacity });
    }
    QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::H).map_err(|e| match e {
        QrError::DataTooLong => ExportError::CapacityExceeded {
            len,
            capacity: capacity.min(MAX_PAYLOAD_BYTES),
        },
        other => ExportError::Encoding(other.to_string()),
    })
}

/// Scale the symbol into a `size`×`size` grayscale PNG
pub fn rasterize(code: &QrCode, size: u32) -> Result<Vec<u8>, ExportError> {
    let modules = code.width() as u32 + 2 * QUIET_ZONE;
    let scale = size / modules;
    if scale == 0 {
        return Err(ExportError::Encoding(format!(
            "a {} px image cannot hold {} modules",
            size, modules
        )));
    }
    let offset = (size - modules * scale) / 2 + QUIET_ZONE * scale;

    let mut img = GrayImage::from_pixel(size, size, Luma([255u8]));
    let width = code.width();
    for (i, color) in code.to_colors().into_iter().enumerate() {
        if color != Color::Dark {
            continue;
        }
        let mx = (i % width) as u32;
        let my = (i / width) as u32;
        for dy in 0..scale {
            for dx in 0..scale {
                img.put_pixel(offset + mx * scale + dx, offset + my * scale + dy, Luma([0u8]));
            }
        }
    }

    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| ExportError::Encoding(e.to_string()))?;
    Ok(bytes)
}

pub fn render(result: &DiagnosticResult, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
    let payload = qr_payload(result)?;
    let code = encode(&payload, options.qr_max_payload_bytes)?;
    log::debug!(
        "[EXPORT] QR payload {} bytes, {} modules",
        payload.len(),
        code.width()
    );
    rasterize(&code, options.qr_image_size)
}

/// Kind recorded in a decoded payload
pub fn payload_kind(payload: &str) -> Option<DiagnosticKind> {
    let value: Value = serde_json::from_str(payload).ok()?;
    let slug = value.get("kind")?.as_str()?;
    DiagnosticKind::ALL.into_iter().find(|k| k.slug() == slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::HealthStatus;
    use crate::models::{HealthCategory, HealthCheck, HealthCheckResult};
    use chrono::Utc;

    fn health() -> DiagnosticResult {
        let checks = HealthCategory::ALL
            .iter()
            .map(|c| HealthCheck::new(*c, 88, "fine", None))
            .collect();
        HealthCheckResult {
            overall_score: 88,
            overall_status: HealthStatus::Good,
            checks,
            recommendations: Vec::new(),
            timestamp: Utc::now(),
        }
        .into()
    }

    #[test]
    fn test_payload_is_compact_json() {
        let payload = qr_payload(&health()).unwrap();
        assert!(payload.len() < 400);
        assert_eq!(payload_kind(&payload), Some(DiagnosticKind::HealthCheck));
        let value: Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["checks"]["Battery"], 88);
    }

    #[test]
    fn test_configured_cap_is_enforced() {
        assert!(matches!(
            encode(&"x".repeat(100), 50),
            Err(ExportError::CapacityExceeded {
                len: 100,
                capacity: 50
            })
        ));
    }

    #[test]
    fn test_encoder_limit_is_capacity_error() {
        // Under a generous cap, the symbol itself runs out of room
        assert!(matches!(
            encode(&"x".repeat(2000), 5000),
            Err(ExportError::CapacityExceeded { len: 2000, .. })
        ));
    }

    #[test]
    fn test_png_has_fixed_size() {
        let options = ExportOptions::default();
        let png = render(&health(), &options).unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!(img.width(), DEFAULT_IMAGE_SIZE);
        assert_eq!(img.height(), DEFAULT_IMAGE_SIZE);
    }

    #[test]
    fn test_too_small_image_fails() {
        let code = encode(&"x".repeat(1000), MAX_PAYLOAD_BYTES).unwrap();
        assert!(matches!(rasterize(&code, 64), Err(ExportError::Encoding(_))));
    }
}
