//! Core table: label-driven cuckoo insertion over anchored sliding windows.
//!
//! The table is a flat run of bins. Every bin position doubles as the entry
//! bin of one window of `B` consecutive bins, forward or reversed (the
//! orientation is a bit in the entry bin's own metadata, and the last `B - 1`
//! entry bins are always reversed so windows never run past the end). Each
//! key gets two candidate windows from one 64-bit hash; insertion always
//! displaces the bin with the minimum label and assigns the displaced spot
//! `min(other_window_min + 1, L_MAX)`, which bounds eviction chains by a
//! small constant. Before evicting, the table tries to manufacture an empty
//! slot inside a candidate window by reversing windows or hopscotching a
//! further-off empty bin closer; those moves keep every element inside its
//! own window and carry labels unchanged.

use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

use crate::hash::{fast_range, hash_tag, secondary};
use crate::layout::BinLayout;
use crate::meta::{MetaWord, L_MAX};
use crate::window;

/// Caller's expectation for a lookup, used to pick the probe order.
///
/// `ExpectPositive` always probes both candidate windows; the other hints
/// skip the secondary window unless the primary entry bin is marked unlucky,
/// and enable the short-hash prefilter on layouts that carry one.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub enum SearchHint {
    #[default]
    Unknown,
    ExpectPositive,
    ExpectNegative,
}

/// The engine behind the set and map façades.
///
/// `B` is the window width (2, 3 or 4). Duplicate keys are the façades'
/// business; the engine places whatever it is handed.
pub(crate) struct CoreTable<const B: usize, K, V, L, S> {
    store: L,
    hasher: S,
    /// Bin count; kept here because rehash retires `store` sizes mid-flight.
    bins: usize,
    len: usize,
    max_load: f32,
    growth: f32,
    _elems: PhantomData<(K, V)>,
}

impl<const B: usize, K, V, L, S> CoreTable<B, K, V, L, S>
where
    L: BinLayout<K, V>,
{
    /// Smallest usable bin count: the pre-reversed tail windows of both
    /// window shapes must fit.
    pub(crate) const MIN_BINS: usize = 2 * B - 2;

    pub(crate) fn with_hasher(hasher: S) -> Self {
        assert!((2..=4).contains(&B), "window width must be 2, 3 or 4");
        Self {
            store: L::with_bins(0),
            hasher,
            bins: 0,
            len: 0,
            max_load: 0.9,
            growth: 1.2,
            _elems: PhantomData,
        }
    }

    pub(crate) fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        assert!((2..=4).contains(&B), "window width must be 2, 3 or 4");
        let bins = capacity.max(Self::MIN_BINS);
        let mut store = L::with_bins(bins);
        for i in 0..B - 1 {
            store.set_bucket_reversed(bins - 1 - i);
        }
        Self {
            store,
            hasher,
            bins,
            len: 0,
            max_load: 0.9,
            growth: 1.2,
            _elems: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.bins
    }

    #[inline]
    pub(crate) fn hasher(&self) -> &S {
        &self.hasher
    }

    #[inline]
    pub(crate) fn load_factor(&self) -> f32 {
        if self.bins == 0 {
            0.0
        } else {
            self.len as f32 / self.bins as f32
        }
    }

    #[inline]
    pub(crate) fn max_load_factor(&self) -> f32 {
        self.max_load
    }

    pub(crate) fn set_max_load_factor(&mut self, factor: f32) {
        assert!(
            factor > 0.0 && factor < 1.0,
            "max load factor must be in (0, 1)"
        );
        self.max_load = factor;
    }

    #[inline]
    pub(crate) fn grow_factor(&self) -> f32 {
        self.growth
    }

    pub(crate) fn set_grow_factor(&mut self, factor: f32) {
        assert!(factor > 1.0, "grow factor must be above 1");
        self.growth = factor;
    }

    pub(crate) fn clear(&mut self) {
        for pos in 0..self.bins {
            if !self.store.word(pos).is_empty() {
                // Safety: non-zero label means the slot holds a live element.
                unsafe { self.store.drop_entry(pos) };
            }
        }
        self.store.zero_meta();
        self.len = 0;
        if self.bins > 0 {
            for i in 0..B - 1 {
                self.store.set_bucket_reversed(self.bins - 1 - i);
            }
        }
    }

    /// Value access for positions produced by `find`.
    #[inline]
    pub(crate) fn value_at(&self, pos: usize) -> &V {
        debug_assert!(!self.store.word(pos).is_empty());
        // Safety: `pos` came from `find`, which only returns occupied bins.
        unsafe { self.store.value_at(pos) }
    }

    /// Mutable value access for positions produced by `find`.
    #[inline]
    pub(crate) fn value_at_mut(&mut self, pos: usize) -> &mut V {
        debug_assert!(!self.store.word(pos).is_empty());
        // Safety: as in `value_at`.
        unsafe { self.store.value_at_mut(pos) }
    }

    /// Removes the element at a position produced by `find`. The bin's
    /// per-bucket bits survive; labels of other bins are left alone, so
    /// long erase/insert churn can degrade the unlucky-bit accuracy (the
    /// secondary probe is then taken more often than strictly needed).
    pub(crate) fn take_at(&mut self, pos: usize) -> (K, V) {
        debug_assert!(!self.store.word(pos).is_empty());
        // Safety: `pos` came from `find`, which only returns occupied bins.
        let entry = unsafe { self.store.take_entry(pos) };
        self.store.clear_occupancy(pos);
        self.len -= 1;
        entry
    }

    ///////////////////////////////////////////////////////////////////////
    // Window scanning helpers
    ///////////////////////////////////////////////////////////////////////

    /// Minimum label over the window starting at `init` and a bin attaining
    /// it. Label 0 short-circuits: an empty bin is always a valid target.
    fn min_label_slot(&self, init: usize) -> (u8, usize) {
        debug_assert!(init + B <= self.bins);
        let mut min = self.store.word(init).label();
        let mut pos = init;
        for i in 1..B {
            if min == 0 {
                break;
            }
            let label = self.store.word(init + i).label();
            if label < min {
                min = label;
                pos = init + i;
            }
        }
        (min, pos)
    }

    /// Entry bin owning the element at `pos`, if any.
    #[inline]
    fn owner_of(&self, pos: usize) -> Option<usize> {
        let w = self.store.word(pos);
        if w.is_empty() {
            None
        } else {
            Some(window::owner(pos, w.distance(), w.item_reversed(), B))
        }
    }

    fn count_empty(&self, init: usize) -> usize {
        (init..init + B)
            .filter(|&pos| self.store.word(pos).is_empty())
            .count()
    }

    /// Elements of the forward window at `anchor` that are owned by
    /// `anchor`. Only meaningful while the window is fully occupied.
    fn count_owned_forward(&self, anchor: usize) -> usize {
        let mut count = 0;
        for i in 0..B {
            let w = self.store.word(anchor + i);
            if !w.item_reversed() && w.distance() == i {
                count += 1;
            }
        }
        count
    }

    /// Elements of the forward window at `anchor` owned by `anchor`, and how
    /// many of those sit outside `[range_init, range_init + B)`.
    fn count_owned_outside(&self, anchor: usize, range_init: usize) -> (usize, usize) {
        let mut owned = 0;
        let mut outside = 0;
        for i in 0..B {
            let pos = anchor + i;
            let w = self.store.word(pos);
            if !w.item_reversed() && w.distance() == i {
                owned += 1;
                // Wrapping turns "left of the range" into a large offset, so
                // one compare covers both sides.
                if pos.wrapping_sub(range_init) >= B {
                    outside += 1;
                }
            }
        }
        (owned, outside)
    }

    /// Metadata write with the engine-level range checks.
    #[inline]
    fn set_item(&mut self, pos: usize, distance: usize, item_reversed: bool, label: u8, tag: u16) {
        debug_assert!(pos < self.bins);
        debug_assert!(distance < B);
        debug_assert!(label >= 1 && label <= L_MAX);
        self.store.update_item(pos, distance, item_reversed, label, tag);
    }

    ///////////////////////////////////////////////////////////////////////
    // Rearrangement
    ///////////////////////////////////////////////////////////////////////

    /// Flips the window at `anchor` from forward to reversed, migrating every
    /// element owned by `anchor` into the reversed range. Labels are carried
    /// unchanged. The caller has verified there are enough empty bins in the
    /// reversed range.
    fn reverse_window(&mut self, anchor: usize) {
        debug_assert!(anchor + 1 >= B);
        debug_assert!(!self.store.word(anchor).bucket_reversed());
        self.store.set_bucket_reversed(anchor);

        // `j` walks the reversed range right-to-left looking for empties;
        // it never backs up, each empty bin is consumed once.
        let mut j = (B - 1) as isize;
        for i in (0..B).rev() {
            if self.owner_of(anchor + i) != Some(anchor) {
                continue;
            }
            while j >= 0 && !self.store.word(anchor - j as usize).is_empty() {
                j -= 1;
            }
            if j >= 0 {
                let dest = anchor - j as usize;
                let w = self.store.word(anchor + i);
                self.set_item(dest, B - 1 - j as usize, true, w.label(), w.tag());
                self.store.clear_occupancy(anchor + i);
                // Safety: `dest` was empty and the source holds an element.
                unsafe { self.store.relocate_entry(dest, anchor + i) };
            } else {
                // Out of empties: only the element sitting on the entry bin
                // itself can be left, and it is already inside the reversed
                // window. Rewrite its metadata in place.
                debug_assert_eq!(i, 0);
                let w = self.store.word(anchor);
                self.set_item(anchor, B - 1, true, w.label(), w.tag());
            }
        }
    }

    /// Tries to produce an empty bin inside the fully-occupied window at
    /// `anchor` (current init `init`) without evicting anything: reverse the
    /// window itself, reverse a neighbouring window to pull its elements
    /// out of ours, or hopscotch a further-off empty bin into the window.
    fn vacate(&mut self, anchor: usize, init: usize) -> Option<usize> {
        // Reverse this window. Requires more empties in the reversed range
        // than elements to migrate, or exactly as many when the entry bin
        // holds its own element (that one may stay in place).
        if !self.store.word(anchor).bucket_reversed() && anchor >= B {
            let empties = self.count_empty(anchor + 1 - B);
            if empties > 0 {
                let owned = self.count_owned_forward(anchor);
                if empties > owned || (empties == owned && self.owner_of(anchor) == Some(anchor)) {
                    if owned > 0 {
                        self.reverse_window(anchor);
                    } else {
                        self.store.set_bucket_reversed(anchor);
                    }
                    let (min, pos) = self.min_label_slot(anchor + 1 - B);
                    debug_assert_eq!(min, 0);
                    return Some(pos);
                }
            }
        }

        // Reverse a neighbouring window whose elements sit in ours. The
        // stricter count: its elements outside our window must fit in its
        // reversed range's empties, with room left over for the ones it
        // pulls out of our window.
        if init >= 2 * B {
            for i in 0..B {
                let pos_elem = init + i;
                let w = self.store.word(pos_elem);
                if w.item_reversed() {
                    continue;
                }
                let neighbour = pos_elem - w.distance();
                if neighbour == anchor {
                    continue;
                }
                debug_assert!(neighbour >= B);
                debug_assert!(!self.store.word(neighbour).bucket_reversed());
                let empties = self.count_empty(neighbour + 1 - B);
                if empties == 0 {
                    continue;
                }
                let (owned, outside) = self.count_owned_outside(neighbour, init);
                debug_assert!(owned >= 1 && owned > outside);
                if outside < empties
                    && (empties >= owned
                        || (empties + 1 == owned && self.owner_of(neighbour) == Some(neighbour)))
                {
                    self.reverse_window(neighbour);
                    let (min, pos) = self.min_label_slot(init);
                    debug_assert_eq!(min, 0);
                    return Some(pos);
                }
            }
        }

        // Hopscotch: scan right for an empty bin, extending the horizon by
        // however far each passed element may itself legally move, then walk
        // the empty back into the window through in-window-legal moves.
        let mut reach = B - 1;
        let mut i = 0;
        while i <= reach && init + i < self.bins {
            let pos = init + i;
            if self.store.word(pos).is_empty() {
                let mut blank = pos;
                while blank - init >= B {
                    let mut swap = blank + 1 - B;
                    while blank - swap > B - 1 - self.store.word(swap).distance() {
                        swap += 1;
                    }
                    let w = self.store.word(swap);
                    self.set_item(
                        blank,
                        w.distance() + (blank - swap),
                        w.item_reversed(),
                        w.label(),
                        w.tag(),
                    );
                    // Safety: `blank` is vacant, `swap` holds an element.
                    unsafe { self.store.relocate_entry(blank, swap) };
                    blank = swap;
                }
                self.store.clear_occupancy(blank);
                return Some(blank);
            }
            let through = i + B - 1 - self.store.word(pos).distance();
            if through > reach {
                reach = through;
            }
            i += 1;
        }

        None
    }
}

impl<const B: usize, K, V, L, S> CoreTable<B, K, V, L, S>
where
    K: Hash,
    L: BinLayout<K, V>,
    S: BuildHasher,
{
    #[inline]
    fn hash_of<Q>(&self, key: &Q) -> u64
    where
        Q: Hash + ?Sized,
    {
        self.hasher.hash_one(key)
    }

    #[inline]
    fn anchor_of(&self, hash: u64) -> usize {
        fast_range(hash, self.bins as u64) as usize
    }

    ///////////////////////////////////////////////////////////////////////
    // Insertion (LSA_max)
    ///////////////////////////////////////////////////////////////////////

    /// One eviction chain. Returns `None` when the element (and every victim
    /// displaced along the way) found a bin, or the element left holding the
    /// chain when both candidate windows saturated at `L_MAX`.
    fn insert_chain(&mut self, mut entry: (K, V)) -> Option<(K, V)> {
        loop {
            let hash0 = self.hash_of(&entry.0);
            let hash1 = secondary(hash0);
            let anchor1 = self.anchor_of(hash0);
            let anchor2 = self.anchor_of(hash1);

            let rev1 = self.store.word(anchor1).bucket_reversed();
            let rev2 = self.store.word(anchor2).bucket_reversed();
            let init1 = window::window_init(anchor1, rev1, B);
            let init2 = window::window_init(anchor2, rev2, B);

            let (min1, pos1) = self.min_label_slot(init1);
            let (min2, pos2) = self.min_label_slot(init2);

            // Empty bin in the primary window.
            if min1 == 0 {
                self.set_item(pos1, pos1 - init1, rev1, next_label(min2), hash_tag(hash0));
                // Safety: label 0 means the slot is vacant.
                unsafe { self.store.write_entry(pos1, entry.0, entry.1) };
                self.len += 1;
                return None;
            }

            // Rearrange the primary window. The window may have flipped, so
            // recompute its shape before writing.
            if let Some(pos) = self.vacate(anchor1, init1) {
                let rev1 = self.store.word(anchor1).bucket_reversed();
                let init1 = window::window_init(anchor1, rev1, B);
                self.set_item(pos, pos - init1, rev1, next_label(min2), hash_tag(hash0));
                // Safety: `vacate` returns a vacated slot.
                unsafe { self.store.write_entry(pos, entry.0, entry.1) };
                self.len += 1;
                return None;
            }

            // Empty bin in the secondary window; the primary entry bin is
            // now unlucky and negative lookups must probe both windows.
            if min2 == 0 {
                self.store.set_unlucky(anchor1);
                self.set_item(pos2, pos2 - init2, rev2, next_label(min1), hash_tag(hash1));
                // Safety: label 0 means the slot is vacant.
                unsafe { self.store.write_entry(pos2, entry.0, entry.1) };
                self.len += 1;
                return None;
            }

            // Rearrange the secondary window.
            if let Some(pos) = self.vacate(anchor2, init2) {
                self.store.set_unlucky(anchor1);
                let rev2 = self.store.word(anchor2).bucket_reversed();
                let init2 = window::window_init(anchor2, rev2, B);
                self.set_item(pos, pos - init2, rev2, next_label(min1), hash_tag(hash1));
                // Safety: `vacate` returns a vacated slot.
                unsafe { self.store.write_entry(pos, entry.0, entry.1) };
                self.len += 1;
                return None;
            }

            // Both windows saturated: no eviction can lower a label below
            // L_MAX, so signal the caller to grow.
            if min1.min(min2) >= L_MAX {
                return Some(entry);
            }

            // Evict the minimum-label bin and continue with its occupant.
            // Ties go to the primary window: that keeps items in their
            // primary window, which is what lets lookups skip the secondary
            // probe most of the time.
            if min1 <= min2 {
                self.set_item(pos1, pos1 - init1, rev1, next_label(min2), hash_tag(hash0));
                entry = self.swap_at(pos1, entry);
            } else {
                self.store.set_unlucky(anchor1);
                self.set_item(pos2, pos2 - init2, rev2, next_label(min1), hash_tag(hash1));
                entry = self.swap_at(pos2, entry);
            }
        }
    }

    fn swap_at(&mut self, pos: usize, entry: (K, V)) -> (K, V) {
        // Safety: `pos` held the victim; it is read out before the write.
        unsafe {
            let victim = self.store.take_entry(pos);
            self.store.write_entry(pos, entry.0, entry.1);
            victim
        }
    }

    /// Places an element, growing the table as often as needed. Duplicate
    /// keys are not checked.
    pub(crate) fn insert_entry(&mut self, key: K, value: V) {
        if self.len as f32 >= self.bins as f32 * self.max_load {
            self.grow();
        }
        let mut entry = (key, value);
        loop {
            match self.insert_chain(entry) {
                None => return,
                Some(displaced) => {
                    entry = displaced;
                    self.grow();
                }
            }
        }
    }

    ///////////////////////////////////////////////////////////////////////
    // Lookup
    ///////////////////////////////////////////////////////////////////////

    #[inline]
    fn probe_hit<Q>(&self, pos: usize, w: MetaWord, tag: Option<u16>, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        if let Some(tag) = tag {
            if !w.matches_tag(tag) {
                return false;
            }
        }
        // The occupancy check must come first: vacant slots hold no key.
        // Safety: checked occupied.
        !w.is_empty() && unsafe { self.store.key_at(pos) }.borrow() == key
    }

    /// Scans the window anchored at `entry` for `key`. `w0` is the entry
    /// bin's word, read once; its orientation bit picks the scan direction.
    fn probe_window<Q>(&self, entry: usize, w0: MetaWord, tag: Option<u16>, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        if self.probe_hit(entry, w0, tag, key) {
            return Some(entry);
        }
        let mut pos = entry;
        for _ in 1..B {
            pos = if w0.bucket_reversed() { pos - 1 } else { pos + 1 };
            if self.probe_hit(pos, self.store.word(pos), tag, key) {
                return Some(pos);
            }
        }
        None
    }

    /// Position of `key`, if present. Lookup never mutates the table.
    pub(crate) fn find<Q>(&self, key: &Q, hint: SearchHint) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.bins == 0 {
            return None;
        }
        let hash = self.hash_of(key);
        let anchor = self.anchor_of(hash);
        let w0 = self.store.word(anchor);

        let prefilter = L::PREFILTER && hint != SearchHint::ExpectPositive;
        let tag = prefilter.then(|| hash_tag(hash));
        if let Some(pos) = self.probe_window(anchor, w0, tag, key) {
            return Some(pos);
        }

        // The secondary window only holds the key if some element anchored
        // at `anchor` overflowed there, which sets the unlucky bit. Positive
        // lookups probe it regardless.
        if hint == SearchHint::ExpectPositive || w0.unlucky() {
            let hash = secondary(hash);
            let anchor = self.anchor_of(hash);
            let tag = prefilter.then(|| hash_tag(hash));
            return self.probe_window(anchor, self.store.word(anchor), tag, key);
        }
        None
    }

    ///////////////////////////////////////////////////////////////////////
    // Growth
    ///////////////////////////////////////////////////////////////////////

    fn grow_size(&self) -> usize {
        (self.bins + Self::MIN_BINS).max((self.bins as f32 * self.growth) as usize)
    }

    fn grow(&mut self) {
        self.rehash(self.grow_size());
    }

    /// Grows the table to at least `new_bins` bins, when that leaves the
    /// required headroom over the current size.
    pub(crate) fn reserve(&mut self, new_bins: usize) {
        if new_bins >= self.bins + Self::MIN_BINS {
            self.rehash(new_bins);
        }
    }

    /// In-place migration into an enlarged bin range.
    ///
    /// Walking the old bins from the top down lets most elements move
    /// directly: an element whose new primary window lies entirely above its
    /// current bin can be placed there without clobbering unread old bins.
    /// The rest spill into a temporary buffer and go through the normal
    /// insertion path; if even that fails, grow a little more and redo.
    fn rehash(&mut self, mut new_bins: usize) {
        debug_assert!(new_bins >= self.bins + Self::MIN_BINS);
        let mut spill: Vec<(K, V)> = Vec::with_capacity((self.len / 8).max(1));

        loop {
            let old_bins = self.bins;
            self.bins = new_bins;
            // Next size up front, in case this round does not fit.
            new_bins += (new_bins >> 5).max(1);

            self.store.grow(self.bins);
            self.len = 0;
            for i in 0..B - 1 {
                self.store.set_bucket_reversed(self.bins - 1 - i);
            }
            tracing::debug!(old_bins, bins = self.bins, "rehashing in place");

            for i in (0..old_bins).rev() {
                if !self.store.word(i).is_empty() {
                    // Safety: the bin is occupied; it is vacated below.
                    let hash = self.hash_of(unsafe { self.store.key_at(i) });
                    let anchor = self.anchor_of(hash);
                    let rev = self.store.word(anchor).bucket_reversed();
                    let init = window::window_init(anchor, rev, B);
                    let mut moved = false;
                    if init > i {
                        let (min, pos) = self.min_label_slot(init);
                        if min == 0 {
                            self.set_item(pos, pos - init, rev, 1, hash_tag(hash));
                            // Safety: `pos` is vacant and above `i`.
                            unsafe { self.store.relocate_entry(pos, i) };
                            self.len += 1;
                            moved = true;
                        }
                    }
                    if !moved {
                        // Safety: occupied, metadata reset right below.
                        spill.push(unsafe { self.store.take_entry(i) });
                    }
                }
                self.store.reset_meta(i);
            }

            let mut fits = true;
            while let Some((key, value)) = spill.pop() {
                if let Some(displaced) = self.insert_chain((key, value)) {
                    // The chain swapped some elements around before giving
                    // up; whatever it ended up holding goes back in the
                    // buffer, membership is unchanged.
                    spill.push(displaced);
                    fits = false;
                    break;
                }
            }
            if fits {
                return;
            }
            tracing::debug!(
                bins = self.bins,
                pending = spill.len(),
                "rehash did not fit, growing again"
            );
        }
    }
}

/// Label for a newly placed element: one above the other window's minimum,
/// saturating at `L_MAX` to stay within 3 bits.
#[inline]
fn next_label(other_min: u8) -> u8 {
    (other_min + 1).min(L_MAX)
}

#[cfg(test)]
impl<const B: usize, K, V, L, S> CoreTable<B, K, V, L, S>
where
    K: Hash,
    L: BinLayout<K, V>,
    S: BuildHasher,
{
    /// Test-only integrity audit: occupancy count matches `len`, every
    /// occupied bin's owner is one of its element's two anchors and lies
    /// within window reach, and any element resting outside its primary
    /// window has the primary entry bin flagged unlucky.
    fn check_integrity(&self) {
        let mut occupied = 0;
        for pos in 0..self.bins {
            let w = self.store.word(pos);
            if w.is_empty() {
                continue;
            }
            occupied += 1;
            assert!(w.label() <= L_MAX);

            let owner = window::owner(pos, w.distance(), w.item_reversed(), B);
            if w.item_reversed() {
                assert!(owner >= pos && owner < pos + B, "bad reversed owner");
                assert!(self.store.word(owner).bucket_reversed());
            } else {
                assert!(owner <= pos && pos < owner + B, "bad forward owner");
            }

            // Safety: occupied.
            let hash = self.hash_of(unsafe { self.store.key_at(pos) });
            let primary = self.anchor_of(hash);
            let secondary_anchor = self.anchor_of(secondary(hash));
            assert!(
                owner == primary || owner == secondary_anchor,
                "owner is neither anchor"
            );
            if owner != primary {
                assert!(
                    self.store.word(primary).unlucky(),
                    "secondary resident without unlucky primary"
                );
            }
        }
        assert_eq!(occupied, self.len);
    }
}
