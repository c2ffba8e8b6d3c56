use crate::document::{Document, NodeId};
use crate::foundation::error::{CollageError, CollageResult};

/// Identifier of the shared shadow filter.
pub const SHADOW_FILTER_ID: &str = "shadow-filter";

/// Layers that receive the shadow.
pub const SHADOW_LAYERS: &[&str] = &["photos", "postits"];

/// Result of [`apply_shadows`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShadowHandle {
    /// The filter element.
    pub filter: NodeId,
    /// Whether the filter was created by this call.
    pub created: bool,
    /// Layer groups now referencing the filter.
    pub layers: Vec<NodeId>,
}

fn shadow_filter_ref() -> String {
    format!("url(#{SHADOW_FILTER_ID})")
}

/// Look up the shadow filter, creating it inside the first `<defs>` when absent.
pub fn ensure_shadow_filter(doc: &mut Document) -> CollageResult<NodeId> {
    if let Some(existing) = doc.get_element_by_id(SHADOW_FILTER_ID) {
        return Ok(existing);
    }
    let defs = doc
        .descendants_by_tag(doc.root(), "defs")
        .first()
        .copied()
        .ok_or_else(|| CollageError::validation("document has no <defs> container"))?;

    let filter = doc.create_element("filter");
    doc.expect_element_mut(filter)?
        .set_attr("id", SHADOW_FILTER_ID);

    let stages: [(&str, &[(&str, &str)]); 3] = [
        (
            "feOffset",
            &[("result", "offOut"), ("in", "SourceAlpha"), ("dx", "2"), ("dy", "2")],
        ),
        (
            "feGaussianBlur",
            &[("result", "blurOut"), ("in", "offOut"), ("stdDeviation", "2")],
        ),
        (
            "feBlend",
            &[("in", "SourceGraphic"), ("in2", "blurOut"), ("mode", "normal")],
        ),
    ];
    for (tag, attrs) in stages {
        let stage = doc.create_element(tag);
        let el = doc.expect_element_mut(stage)?;
        for &(k, v) in attrs {
            el.set_attr(k, v);
        }
        doc.append_child(filter, stage)?;
    }

    doc.append_child(defs, filter)?;
    Ok(filter)
}

/// Attach the shared shadow filter to the photo and note layers. Safe to run repeatedly.
#[tracing::instrument(skip(doc))]
pub fn apply_shadows(doc: &mut Document) -> CollageResult<ShadowHandle> {
    let created = doc.get_element_by_id(SHADOW_FILTER_ID).is_none();
    let filter = ensure_shadow_filter(doc)?;

    let layers: Vec<NodeId> = SHADOW_LAYERS
        .iter()
        .filter_map(|name| doc.layer(name))
        .collect();
    let reference = shadow_filter_ref();
    for &layer in &layers {
        doc.expect_element_mut(layer)?
            .set_attr("filter", reference.as_str());
    }

    tracing::info!(created, layers = layers.len(), "shadow attached");
    Ok(ShadowHandle {
        filter,
        created,
        layers,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/effects/shadow.rs"]
mod tests;
