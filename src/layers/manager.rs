use crate::{
    layers::base::{LayerTrait, LayerType},
    MapError, Result,
};

/// Layers of one map, kept in paint order.
///
/// Panes paint bottom to top (tiles, overlays, markers); inside a pane the
/// layer added last ends up on top.
#[derive(Debug, Default)]
pub struct LayerManager {
    stack: Vec<Box<dyn LayerTrait>>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn index_of(&self, layer_id: &str) -> Option<usize> {
        self.stack.iter().position(|layer| layer.id() == layer_id)
    }

    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        if self.contains(layer.id()) {
            return Err(MapError::Backend(format!("duplicate layer id {}", layer.id())));
        }

        let z_index = layer.z_index();
        let slot = self
            .stack
            .iter()
            .position(|other| other.z_index() > z_index)
            .unwrap_or(self.stack.len());
        self.stack.insert(slot, layer);
        Ok(())
    }

    pub fn remove_layer(&mut self, layer_id: &str) -> Result<Box<dyn LayerTrait>> {
        let index = self
            .index_of(layer_id)
            .ok_or_else(|| MapError::LayerNotFound(layer_id.to_string()))?;
        Ok(self.stack.remove(index))
    }

    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.index_of(layer_id).map(|index| self.stack[index].as_ref())
    }

    /// Layer downcast to its concrete type
    pub fn get_as<T: 'static>(&self, layer_id: &str) -> Option<&T> {
        self.get_layer(layer_id)?.as_any().downcast_ref::<T>()
    }

    pub fn with_layer_mut<F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn LayerTrait) -> R,
    {
        let index = self.index_of(layer_id)?;
        Some(f(self.stack[index].as_mut()))
    }

    pub fn contains(&self, layer_id: &str) -> bool {
        self.index_of(layer_id).is_some()
    }

    pub fn list_layers(&self) -> Vec<String> {
        self.stack.iter().map(|layer| layer.id().to_string()).collect()
    }

    pub fn layers(&self) -> Vec<&dyn LayerTrait> {
        self.stack.iter().map(|layer| layer.as_ref()).collect()
    }

    pub fn layers_of_type(&self, layer_type: LayerType) -> Vec<&dyn LayerTrait> {
        self.stack
            .iter()
            .filter(|layer| layer.layer_type() == layer_type)
            .map(|layer| layer.as_ref())
            .collect()
    }

    pub fn for_each_layer_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut dyn LayerTrait),
    {
        for layer in self.stack.iter_mut() {
            f(layer.as_mut());
        }
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CircleOptions;
    use crate::core::geo::LatLng;
    use crate::layers::{circle::Circle, marker::Marker};

    fn marker(id: &str) -> Box<dyn LayerTrait> {
        Box::new(Marker::new(id.into(), LatLng::new(1.0, 2.0)))
    }

    #[test]
    fn test_paint_order_follows_panes() {
        let mut manager = LayerManager::new();
        manager.add_layer(marker("m1")).unwrap();
        manager
            .add_layer(Box::new(Circle::new(
                "c".into(),
                LatLng::new(1.0, 1.0),
                100.0,
                CircleOptions::default(),
            )))
            .unwrap();
        manager.add_layer(marker("m2")).unwrap();

        assert_eq!(manager.list_layers(), vec!["c", "m1", "m2"]);
        assert_eq!(manager.layers_of_type(LayerType::Marker).len(), 2);
    }

    #[test]
    fn test_remove_and_lookup() {
        let mut manager = LayerManager::new();
        manager.add_layer(marker("m")).unwrap();

        assert_eq!(
            manager.get_as::<Marker>("m").map(|m| m.position()),
            Some(LatLng::new(1.0, 2.0))
        );
        assert!(manager.get_as::<Circle>("m").is_none());

        assert!(manager.remove_layer("m").is_ok());
        assert!(matches!(
            manager.remove_layer("m"),
            Err(MapError::LayerNotFound(_))
        ));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut manager = LayerManager::new();
        manager.add_layer(marker("m")).unwrap();
        assert!(manager.add_layer(marker("m")).is_err());
        assert_eq!(manager.len(), 1);
    }
}
