use slotmap::new_key_type;

new_key_type! {
    /// Opaque identifier for a component stored in the screen arena.
    ///
    /// Ids are stable across arena mutation and safe to hold from outside the
    /// event loop; a stale id simply no longer resolves.
    pub struct ComponentId;
}
