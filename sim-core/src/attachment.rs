use crate::{particle::ParticleSet, types::ParticleId};

/// Attachment state as seen by the nearest-neighbor search during a step.
///
/// For each `ParticleId`, this mask stores whether the particle counts as a
/// cluster member for the search. It is captured from the particle set at
/// the start of a step, so attachments decided while the step is running
/// stay invisible until they are merged at the end of it.
///
/// Attachments decided during the step are queued with
/// [`AttachmentMask::defer`] and handed back by
/// [`AttachmentMask::take_deferred`], which also publishes them.
#[derive(Debug, Default)]
pub struct AttachmentMask {
    /// Per-particle cluster membership visible to the search.
    attached: Vec<bool>,
    /// Attachments decided this step, in decision order.
    deferred: Vec<ParticleId>,
}

impl AttachmentMask {
    /// Creates a mask mirroring the current attachment flags of `set`.
    pub fn capture(set: &ParticleSet) -> Self {
        let mut mask = Self::default();
        mask.recapture(set);
        mask
    }

    /// Re-reads the attachment flags of `set` and drops anything deferred.
    ///
    /// The storage is reused when the population size is unchanged.
    pub fn recapture(&mut self, set: &ParticleSet) {
        self.attached.clear();
        self.attached
            .extend(set.as_slice().iter().map(|p| p.attached));
        self.deferred.clear();
    }

    /// Returns `true` if `id` is a visible cluster member.
    ///
    /// ### Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    pub fn is_attached(&self, id: ParticleId) -> bool {
        self.attached[id]
    }

    /// Makes `id` visible to the search immediately.
    #[inline]
    pub fn publish(&mut self, id: ParticleId) {
        self.attached[id] = true;
    }

    /// Records that `id` attaches this step without publishing it yet.
    #[inline]
    pub fn defer(&mut self, id: ParticleId) {
        self.deferred.push(id);
    }

    /// Publishes and drains every deferred attachment.
    pub fn take_deferred(&mut self) -> Vec<ParticleId> {
        let ids = std::mem::take(&mut self.deferred);
        for &id in &ids {
            self.attached[id] = true;
        }
        ids
    }

    /// Iterates over the ids currently visible as cluster members.
    pub fn attached_indices(&self) -> impl Iterator<Item = ParticleId> + '_ {
        self.attached
            .iter()
            .enumerate()
            .filter_map(|(i, &a)| if a { Some(i) } else { None })
    }
}
