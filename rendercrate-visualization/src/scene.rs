//! Scene graph: a flat list of actors and a background color

use crate::actor::Actor;
use rendercrate_core::{Aabb, Drawable};
use rendercrate_gpu::DrawItem;

#[derive(Debug, Clone)]
pub struct Scene {
    actors: Vec<Actor>,
    /// RGB in [0, 1]
    pub background_color: [f32; 3],
}

impl Scene {
    pub fn new(background_color: [f32; 3]) -> Self {
        Self {
            actors: Vec::new(),
            background_color,
        }
    }

    /// Add an actor and return its index
    pub fn add_actor(&mut self, actor: Actor) -> usize {
        log::debug!(
            "Adding actor with {} points and {} polygons",
            actor.num_points(),
            actor.num_polygons()
        );
        self.actors.push(actor);
        self.actors.len() - 1
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn actor_mut(&mut self, index: usize) -> Option<&mut Actor> {
        self.actors.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn draw_items(&self) -> Vec<DrawItem<'_>> {
        self.actors.iter().filter(|a| a.visible).map(Actor::draw_item).collect()
    }

    pub fn background_rgba(&self) -> [f64; 4] {
        let [r, g, b] = self.background_color;
        [r as f64, g as f64, b as f64, 1.0]
    }
}

impl Drawable for Scene {
    /// Union of the bounds of all visible actors
    fn bounds(&self) -> Option<Aabb> {
        self.actors
            .iter()
            .filter(|a| a.visible)
            .filter_map(Actor::bounds)
            .reduce(|a, b| a.union(&b))
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new([0.0, 0.0, 1.0])
    }
}
