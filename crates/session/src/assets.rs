use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable per-session identifier for an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId(Uuid);

impl AssetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Semantic role of an uploaded image. `Start` and `End` are each held by
/// at most one asset at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Designation {
    /// Seeds the first frame of the video.
    Start,
    /// Seeds the last frame of the video.
    End,
    /// Stylistic/subject reference, any number allowed.
    Reference,
    #[default]
    None,
}

/// An already-encoded image the user supplied. Payload is opaque to this
/// crate; acquisition and cropping happen upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAsset {
    pub id: AssetId,
    /// Base64-encoded content.
    pub payload: String,
    /// Declared content type of the payload.
    pub media_type: String,
    pub designation: Designation,
}

impl ImageAsset {
    pub fn new(payload: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            id: AssetId::new(),
            payload: payload.into(),
            media_type: media_type.into(),
            designation: Designation::None,
        }
    }
}

/// Ordered collection of uploaded images. All designation changes go
/// through `set_designation`, which enforces the Start/End exclusivity and
/// toggle rules; callers never patch designations directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesignationStore {
    assets: Vec<ImageAsset>,
}

impl DesignationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new asset. Capacity is unbounded here; the presentation
    /// layer may cap the count if it wants to.
    pub fn add(&mut self, asset: ImageAsset) {
        self.assets.push(asset);
    }

    /// Deletes the asset with `id`. No-op when absent.
    pub fn remove(&mut self, id: AssetId) {
        self.assets.retain(|a| a.id != id);
    }

    /// Applies `role` to the asset with `id`. Re-applying the asset's
    /// current role resets it to `None`; assigning `Start` or `End` demotes
    /// any other holder of that role. Silent no-op on unknown ids.
    pub fn set_designation(&mut self, id: AssetId, role: Designation) {
        let Some(idx) = self.assets.iter().position(|a| a.id == id) else {
            return;
        };

        if self.assets[idx].designation == role {
            self.assets[idx].designation = Designation::None;
            return;
        }

        if matches!(role, Designation::Start | Designation::End) {
            for asset in &mut self.assets {
                if asset.designation == role {
                    asset.designation = Designation::None;
                }
            }
        }

        self.assets[idx].designation = role;
    }

    /// Assets currently holding `role`, in insertion order.
    pub fn query(&self, role: Designation) -> Vec<&ImageAsset> {
        self.assets
            .iter()
            .filter(|a| a.designation == role)
            .collect()
    }

    pub fn start(&self) -> Option<&ImageAsset> {
        self.assets
            .iter()
            .find(|a| a.designation == Designation::Start)
    }

    pub fn end(&self) -> Option<&ImageAsset> {
        self.assets
            .iter()
            .find(|a| a.designation == Designation::End)
    }

    pub fn get(&self, id: AssetId) -> Option<&ImageAsset> {
        self.assets.iter().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageAsset> {
        self.assets.iter()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset() -> ImageAsset {
        ImageAsset::new("aGVsbG8=", "image/png")
    }

    #[test]
    fn test_add_starts_undesignated() {
        let mut store = DesignationStore::new();
        let img = asset();
        let id = img.id;
        store.add(img);
        assert_eq!(store.get(id).unwrap().designation, Designation::None);
    }

    #[test]
    fn test_start_is_exclusive() {
        let mut store = DesignationStore::new();
        let (a, b) = (asset(), asset());
        let (id_a, id_b) = (a.id, b.id);
        store.add(a);
        store.add(b);

        store.set_designation(id_a, Designation::Start);
        store.set_designation(id_b, Designation::Start);

        assert_eq!(store.get(id_a).unwrap().designation, Designation::None);
        assert_eq!(store.get(id_b).unwrap().designation, Designation::Start);
        assert_eq!(store.query(Designation::Start).len(), 1);
    }

    #[test]
    fn test_start_and_end_exclusivity_under_arbitrary_sequences() {
        let mut store = DesignationStore::new();
        let ids: Vec<AssetId> = (0..4)
            .map(|_| {
                let a = asset();
                let id = a.id;
                store.add(a);
                id
            })
            .collect();

        let moves = [
            (0, Designation::Start),
            (1, Designation::End),
            (2, Designation::Start),
            (3, Designation::Reference),
            (1, Designation::Start),
            (0, Designation::End),
            (2, Designation::Reference),
        ];
        for (i, role) in moves {
            store.set_designation(ids[i], role);
            assert!(store.query(Designation::Start).len() <= 1);
            assert!(store.query(Designation::End).len() <= 1);
        }
    }

    #[test]
    fn test_reapply_toggles_back_to_none() {
        let mut store = DesignationStore::new();
        let a = asset();
        let id = a.id;
        store.add(a);

        store.set_designation(id, Designation::Reference);
        assert_eq!(store.get(id).unwrap().designation, Designation::Reference);
        store.set_designation(id, Designation::Reference);
        assert_eq!(store.get(id).unwrap().designation, Designation::None);
    }

    #[test]
    fn test_unknown_id_is_silent() {
        let mut store = DesignationStore::new();
        let a = asset();
        let id = a.id;
        store.add(a);
        store.set_designation(AssetId::new(), Designation::Start);
        assert!(store.start().is_none());
        assert_eq!(store.get(id).unwrap().designation, Designation::None);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut store = DesignationStore::new();
        store.add(asset());
        store.remove(AssetId::new());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_query_preserves_insertion_order() {
        let mut store = DesignationStore::new();
        let (a, b, c) = (asset(), asset(), asset());
        let (id_a, id_b, id_c) = (a.id, b.id, c.id);
        store.add(a);
        store.add(b);
        store.add(c);

        store.set_designation(id_c, Designation::Reference);
        store.set_designation(id_a, Designation::Reference);
        store.set_designation(id_b, Designation::Reference);

        let order: Vec<AssetId> = store
            .query(Designation::Reference)
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(order, vec![id_a, id_b, id_c]);
    }
}
