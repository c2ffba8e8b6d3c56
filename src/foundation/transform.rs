use std::str::FromStr;

use crate::foundation::core::Affine;
use crate::foundation::error::{CollageError, CollageResult};

/// Parse an SVG `transform` attribute into an affine matrix.
///
/// An absent or blank expression is the identity. Transform lists are folded left to right, as
/// SVG applies them.
pub fn parse_transform(expr: Option<&str>) -> CollageResult<Affine> {
    let Some(expr) = expr.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(Affine::IDENTITY);
    };
    let t = svgtypes::Transform::from_str(expr)
        .map_err(|e| CollageError::validation(format!("invalid transform \"{expr}\": {e}")))?;
    let affine = Affine::new([t.a, t.b, t.c, t.d, t.e, t.f]);
    if !affine.is_finite() {
        return Err(CollageError::validation(format!(
            "transform must be finite: \"{expr}\""
        )));
    }
    Ok(affine)
}

/// Compose two transforms as `outer · inner`.
///
/// A point in the inner coordinate space is mapped by `inner` first, then by `outer`. An absent
/// inner transform is the identity.
pub fn compose(outer: Affine, inner: Option<Affine>) -> Affine {
    match inner {
        Some(inner) => outer * inner,
        None => outer,
    }
}

/// Serialize a transform as an SVG `matrix(...)` expression.
pub fn format_transform(t: Affine) -> String {
    let [a, b, c, d, e, f] = t.as_coeffs();
    format!("matrix({a}, {b}, {c}, {d}, {e}, {f})")
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/transform.rs"]
mod tests;
