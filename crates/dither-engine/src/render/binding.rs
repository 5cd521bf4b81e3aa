/// A GPU object built from an offscreen target, tagged with that target's generation.
///
/// Bind groups capture a texture view at creation time. Reading through a slot
/// instead of holding the bind group directly means a reallocated target can never be
/// drawn through a view of the texture it replaced.
pub(crate) struct GenerationSlot<T> {
    value: Option<T>,
    generation: u64,
}

impl<T> GenerationSlot<T> {
    pub(crate) const fn new() -> Self {
        Self {
            value: None,
            generation: 0,
        }
    }

    /// Returns the stored value if it was built for `generation`, rebuilding otherwise.
    pub(crate) fn get_or_rebuild(&mut self, generation: u64, build: impl FnOnce() -> T) -> &T {
        if self.generation != generation || self.value.is_none() {
            self.value = None;
            self.generation = generation;
        }
        self.value.get_or_insert_with(build)
    }

    /// The stored value, only if it was built for `generation`.
    pub(crate) fn get(&self, generation: u64) -> Option<&T> {
        self.value.as_ref().filter(|_| self.generation == generation)
    }

    /// Generation of the stored value, `0` when empty.
    pub(crate) fn generation(&self) -> u64 {
        if self.value.is_some() { self.generation } else { 0 }
    }

    /// Drops the stored value (e.g. after the layout it was built against changed).
    pub(crate) fn clear(&mut self) {
        self.value = None;
        self.generation = 0;
    }
}

impl<T> Default for GenerationSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebuilds_only_on_generation_change() {
        let mut slot = GenerationSlot::new();
        let mut builds = 0;

        assert_eq!(*slot.get_or_rebuild(3, || { builds += 1; "a" }), "a");
        assert_eq!(*slot.get_or_rebuild(3, || { builds += 1; "b" }), "a");
        assert_eq!(builds, 1);

        assert_eq!(*slot.get_or_rebuild(4, || { builds += 1; "c" }), "c");
        assert_eq!(builds, 2);
        assert_eq!(slot.generation(), 4);
    }

    #[test]
    fn get_refuses_other_generations() {
        let mut slot = GenerationSlot::new();
        assert!(slot.get(0).is_none());
        slot.get_or_rebuild(5, || "view");
        assert_eq!(slot.get(5), Some(&"view"));
        assert!(slot.get(6).is_none());
    }

    #[test]
    fn clear_forces_rebuild() {
        let mut slot = GenerationSlot::new();
        slot.get_or_rebuild(7, || 1);
        slot.clear();
        assert_eq!(slot.generation(), 0);
        assert_eq!(*slot.get_or_rebuild(7, || 2), 2);
    }
}
