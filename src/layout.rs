//! Bin storage layouts.
//!
//! The engine is written against [`BinLayout`]; the three implementations
//! differ only in where the metadata and the elements physically live:
//!
//! - [`SoaLayout`]: metadata, keys and values each in their own array.
//!   Metadata is 16 bits per bin, with the high byte holding a short-hash
//!   tag that lets negative lookups reject a bin without touching the key
//!   array. The fastest for negative queries.
//! - [`AosLayout`]: one packed record per bin (1 metadata byte + key +
//!   value). The fastest for positive queries.
//! - [`AobLayout`]: records grouped into aligned blocks of eight bins.
//!
//! A bin is occupied iff its metadata label is non-zero; element slots are
//! `MaybeUninit` and the occupied ones are dropped when the layout drops.
//! Sets are maps with `V = ()`.

use std::mem::MaybeUninit;

use crate::meta::MetaWord;

/// Storage for `bins` element slots plus one metadata word each.
///
/// Positions handed to the `unsafe` element accessors must be occupied
/// (label != 0), except `write_entry`, whose target must be vacant or
/// already moved out of. `take_entry` and `relocate_entry` leave the source
/// slot logically vacant; the caller must rewrite or clear its metadata
/// before anything else reads it.
pub trait BinLayout<K, V> {
    /// Whether this layout stores a short-hash tag usable as a negative
    /// lookup prefilter.
    const PREFILTER: bool;

    fn with_bins(bins: usize) -> Self;

    fn bins(&self) -> usize;

    /// Extends storage to `new_bins` bins, zeroing the new metadata tail and
    /// keeping every existing bin in place.
    fn grow(&mut self, new_bins: usize);

    fn word(&self, pos: usize) -> MetaWord;

    /// Rewrites the per-item metadata fields at `pos`, keeping the
    /// per-bucket bits. `tag` is ignored by layouts without a prefilter.
    fn update_item(&mut self, pos: usize, distance: usize, item_reversed: bool, label: u8, tag: u16);

    /// Marks `pos` empty, keeping the per-bucket bits.
    fn clear_occupancy(&mut self, pos: usize);

    /// Zeroes the whole metadata word at `pos`, per-bucket bits included.
    fn reset_meta(&mut self, pos: usize);

    /// Zeroes every metadata word.
    fn zero_meta(&mut self);

    fn set_bucket_reversed(&mut self, pos: usize);

    fn set_unlucky(&mut self, pos: usize);

    /// # Safety
    /// `pos` must be occupied.
    unsafe fn key_at(&self, pos: usize) -> &K;

    /// # Safety
    /// `pos` must be occupied.
    unsafe fn value_at(&self, pos: usize) -> &V;

    /// # Safety
    /// `pos` must be occupied.
    unsafe fn value_at_mut(&mut self, pos: usize) -> &mut V;

    /// # Safety
    /// The slot at `pos` must be vacant (or already moved out of).
    unsafe fn write_entry(&mut self, pos: usize, key: K, value: V);

    /// Moves the element out of `pos`.
    ///
    /// # Safety
    /// `pos` must be occupied.
    unsafe fn take_entry(&mut self, pos: usize) -> (K, V);

    /// Moves the element from `orig` into `dest` without touching metadata.
    ///
    /// # Safety
    /// `orig` must be occupied and `dest` vacant; `dest != orig`.
    unsafe fn relocate_entry(&mut self, dest: usize, orig: usize);

    /// Runs the element destructors at `pos` in place.
    ///
    /// # Safety
    /// `pos` must be occupied, and its metadata must be cleared before the
    /// slot is read again.
    unsafe fn drop_entry(&mut self, pos: usize);
}

///////////////////////////////////////////////////////////////////////////
// Struct of arrays
///////////////////////////////////////////////////////////////////////////

/// Metadata, keys and values in separate arrays; 16-bit metadata with a
/// short-hash tag in the high byte.
pub struct SoaLayout<K, V> {
    meta: Vec<u16>,
    keys: Vec<MaybeUninit<K>>,
    values: Vec<MaybeUninit<V>>,
}

impl<K, V> BinLayout<K, V> for SoaLayout<K, V> {
    const PREFILTER: bool = true;

    fn with_bins(bins: usize) -> Self {
        let mut keys = Vec::with_capacity(bins);
        keys.resize_with(bins, MaybeUninit::uninit);
        let mut values = Vec::with_capacity(bins);
        values.resize_with(bins, MaybeUninit::uninit);
        Self {
            meta: vec![0; bins],
            keys,
            values,
        }
    }

    #[inline]
    fn bins(&self) -> usize {
        self.meta.len()
    }

    fn grow(&mut self, new_bins: usize) {
        debug_assert!(new_bins >= self.meta.len());
        self.meta.resize(new_bins, 0);
        self.keys.resize_with(new_bins, MaybeUninit::uninit);
        self.values.resize_with(new_bins, MaybeUninit::uninit);
    }

    #[inline]
    fn word(&self, pos: usize) -> MetaWord {
        MetaWord::from_raw(self.meta[pos])
    }

    #[inline]
    fn update_item(&mut self, pos: usize, distance: usize, item_reversed: bool, label: u8, tag: u16) {
        self.meta[pos] = self
            .word(pos)
            .with_item(distance, item_reversed, label, tag)
            .raw();
    }

    #[inline]
    fn clear_occupancy(&mut self, pos: usize) {
        self.meta[pos] = self.word(pos).cleared().raw();
    }

    #[inline]
    fn reset_meta(&mut self, pos: usize) {
        self.meta[pos] = 0;
    }

    fn zero_meta(&mut self) {
        self.meta.fill(0);
    }

    #[inline]
    fn set_bucket_reversed(&mut self, pos: usize) {
        self.meta[pos] = self.word(pos).with_bucket_reversed().raw();
    }

    #[inline]
    fn set_unlucky(&mut self, pos: usize) {
        self.meta[pos] = self.word(pos).with_unlucky().raw();
    }

    #[inline]
    unsafe fn key_at(&self, pos: usize) -> &K {
        self.keys[pos].assume_init_ref()
    }

    #[inline]
    unsafe fn value_at(&self, pos: usize) -> &V {
        self.values[pos].assume_init_ref()
    }

    #[inline]
    unsafe fn value_at_mut(&mut self, pos: usize) -> &mut V {
        self.values[pos].assume_init_mut()
    }

    #[inline]
    unsafe fn write_entry(&mut self, pos: usize, key: K, value: V) {
        self.keys[pos].write(key);
        self.values[pos].write(value);
    }

    #[inline]
    unsafe fn take_entry(&mut self, pos: usize) -> (K, V) {
        (
            self.keys[pos].assume_init_read(),
            self.values[pos].assume_init_read(),
        )
    }

    #[inline]
    unsafe fn relocate_entry(&mut self, dest: usize, orig: usize) {
        debug_assert_ne!(dest, orig);
        let key = self.keys[orig].assume_init_read();
        self.keys[dest].write(key);
        let value = self.values[orig].assume_init_read();
        self.values[dest].write(value);
    }

    #[inline]
    unsafe fn drop_entry(&mut self, pos: usize) {
        self.keys[pos].assume_init_drop();
        self.values[pos].assume_init_drop();
    }
}

impl<K, V> Drop for SoaLayout<K, V> {
    fn drop(&mut self) {
        for pos in 0..self.meta.len() {
            if MetaWord::from_raw(self.meta[pos]).is_empty() {
                continue;
            }
            // Safety: non-zero label means the slot holds a live element.
            unsafe {
                self.keys[pos].assume_init_drop();
                self.values[pos].assume_init_drop();
            }
        }
    }
}

///////////////////////////////////////////////////////////////////////////
// Array of structs
///////////////////////////////////////////////////////////////////////////

#[repr(C)]
struct AosBin<K, V> {
    meta: u8,
    key: MaybeUninit<K>,
    value: MaybeUninit<V>,
}

impl<K, V> AosBin<K, V> {
    fn empty() -> Self {
        Self {
            meta: 0,
            // Safety: MaybeUninit does not require initialization
            key: MaybeUninit::uninit(),
            value: MaybeUninit::uninit(),
        }
    }
}

/// One packed record per bin: metadata byte, key and value together.
pub struct AosLayout<K, V> {
    bins: Vec<AosBin<K, V>>,
}

impl<K, V> BinLayout<K, V> for AosLayout<K, V> {
    const PREFILTER: bool = false;

    fn with_bins(bins: usize) -> Self {
        let mut v = Vec::with_capacity(bins);
        v.resize_with(bins, AosBin::empty);
        Self { bins: v }
    }

    #[inline]
    fn bins(&self) -> usize {
        self.bins.len()
    }

    fn grow(&mut self, new_bins: usize) {
        debug_assert!(new_bins >= self.bins.len());
        self.bins.resize_with(new_bins, AosBin::empty);
    }

    #[inline]
    fn word(&self, pos: usize) -> MetaWord {
        MetaWord::from_byte(self.bins[pos].meta)
    }

    #[inline]
    fn update_item(&mut self, pos: usize, distance: usize, item_reversed: bool, label: u8, tag: u16) {
        self.bins[pos].meta = self
            .word(pos)
            .with_item(distance, item_reversed, label, tag)
            .byte();
    }

    #[inline]
    fn clear_occupancy(&mut self, pos: usize) {
        self.bins[pos].meta = self.word(pos).cleared().byte();
    }

    #[inline]
    fn reset_meta(&mut self, pos: usize) {
        self.bins[pos].meta = 0;
    }

    fn zero_meta(&mut self) {
        for bin in &mut self.bins {
            bin.meta = 0;
        }
    }

    #[inline]
    fn set_bucket_reversed(&mut self, pos: usize) {
        self.bins[pos].meta = self.word(pos).with_bucket_reversed().byte();
    }

    #[inline]
    fn set_unlucky(&mut self, pos: usize) {
        self.bins[pos].meta = self.word(pos).with_unlucky().byte();
    }

    #[inline]
    unsafe fn key_at(&self, pos: usize) -> &K {
        self.bins[pos].key.assume_init_ref()
    }

    #[inline]
    unsafe fn value_at(&self, pos: usize) -> &V {
        self.bins[pos].value.assume_init_ref()
    }

    #[inline]
    unsafe fn value_at_mut(&mut self, pos: usize) -> &mut V {
        self.bins[pos].value.assume_init_mut()
    }

    #[inline]
    unsafe fn write_entry(&mut self, pos: usize, key: K, value: V) {
        self.bins[pos].key.write(key);
        self.bins[pos].value.write(value);
    }

    #[inline]
    unsafe fn take_entry(&mut self, pos: usize) -> (K, V) {
        (
            self.bins[pos].key.assume_init_read(),
            self.bins[pos].value.assume_init_read(),
        )
    }

    #[inline]
    unsafe fn relocate_entry(&mut self, dest: usize, orig: usize) {
        debug_assert_ne!(dest, orig);
        let key = self.bins[orig].key.assume_init_read();
        self.bins[dest].key.write(key);
        let value = self.bins[orig].value.assume_init_read();
        self.bins[dest].value.write(value);
    }

    #[inline]
    unsafe fn drop_entry(&mut self, pos: usize) {
        self.bins[pos].key.assume_init_drop();
        self.bins[pos].value.assume_init_drop();
    }
}

impl<K, V> Drop for AosLayout<K, V> {
    fn drop(&mut self) {
        for bin in &mut self.bins {
            if MetaWord::from_byte(bin.meta).is_empty() {
                continue;
            }
            // Safety: non-zero label means the slot holds a live element.
            unsafe {
                bin.key.assume_init_drop();
                bin.value.assume_init_drop();
            }
        }
    }
}

///////////////////////////////////////////////////////////////////////////
// Array of blocks
///////////////////////////////////////////////////////////////////////////

/// Bins per block.
const BLOCK: usize = 8;

#[repr(C)]
struct AobBlock<K, V> {
    meta: [u8; BLOCK],
    keys: [MaybeUninit<K>; BLOCK],
    values: [MaybeUninit<V>; BLOCK],
}

impl<K, V> AobBlock<K, V> {
    fn empty() -> Self {
        Self {
            meta: [0; BLOCK],
            // Safety: MaybeUninit does not require initialization
            keys: unsafe { MaybeUninit::uninit().assume_init() },
            values: unsafe { MaybeUninit::uninit().assume_init() },
        }
    }
}

/// Records grouped into aligned blocks of [`BLOCK`] bins.
pub struct AobLayout<K, V> {
    blocks: Vec<AobBlock<K, V>>,
    bins: usize,
}

impl<K, V> AobLayout<K, V> {
    #[inline]
    fn split(pos: usize) -> (usize, usize) {
        (pos / BLOCK, pos % BLOCK)
    }

    #[inline]
    fn blocks_for(bins: usize) -> usize {
        bins.div_ceil(BLOCK)
    }
}

impl<K, V> BinLayout<K, V> for AobLayout<K, V> {
    const PREFILTER: bool = false;

    fn with_bins(bins: usize) -> Self {
        let mut blocks = Vec::with_capacity(Self::blocks_for(bins));
        blocks.resize_with(Self::blocks_for(bins), AobBlock::empty);
        Self { blocks, bins }
    }

    #[inline]
    fn bins(&self) -> usize {
        self.bins
    }

    fn grow(&mut self, new_bins: usize) {
        debug_assert!(new_bins >= self.bins);
        self.blocks.resize_with(Self::blocks_for(new_bins), AobBlock::empty);
        self.bins = new_bins;
    }

    #[inline]
    fn word(&self, pos: usize) -> MetaWord {
        let (b, i) = Self::split(pos);
        MetaWord::from_byte(self.blocks[b].meta[i])
    }

    #[inline]
    fn update_item(&mut self, pos: usize, distance: usize, item_reversed: bool, label: u8, tag: u16) {
        let byte = self
            .word(pos)
            .with_item(distance, item_reversed, label, tag)
            .byte();
        let (b, i) = Self::split(pos);
        self.blocks[b].meta[i] = byte;
    }

    #[inline]
    fn clear_occupancy(&mut self, pos: usize) {
        let byte = self.word(pos).cleared().byte();
        let (b, i) = Self::split(pos);
        self.blocks[b].meta[i] = byte;
    }

    #[inline]
    fn reset_meta(&mut self, pos: usize) {
        let (b, i) = Self::split(pos);
        self.blocks[b].meta[i] = 0;
    }

    fn zero_meta(&mut self) {
        for block in &mut self.blocks {
            block.meta = [0; BLOCK];
        }
    }

    #[inline]
    fn set_bucket_reversed(&mut self, pos: usize) {
        let byte = self.word(pos).with_bucket_reversed().byte();
        let (b, i) = Self::split(pos);
        self.blocks[b].meta[i] = byte;
    }

    #[inline]
    fn set_unlucky(&mut self, pos: usize) {
        let byte = self.word(pos).with_unlucky().byte();
        let (b, i) = Self::split(pos);
        self.blocks[b].meta[i] = byte;
    }

    #[inline]
    unsafe fn key_at(&self, pos: usize) -> &K {
        let (b, i) = Self::split(pos);
        self.blocks[b].keys[i].assume_init_ref()
    }

    #[inline]
    unsafe fn value_at(&self, pos: usize) -> &V {
        let (b, i) = Self::split(pos);
        self.blocks[b].values[i].assume_init_ref()
    }

    #[inline]
    unsafe fn value_at_mut(&mut self, pos: usize) -> &mut V {
        let (b, i) = Self::split(pos);
        self.blocks[b].values[i].assume_init_mut()
    }

    #[inline]
    unsafe fn write_entry(&mut self, pos: usize, key: K, value: V) {
        let (b, i) = Self::split(pos);
        self.blocks[b].keys[i].write(key);
        self.blocks[b].values[i].write(value);
    }

    #[inline]
    unsafe fn take_entry(&mut self, pos: usize) -> (K, V) {
        let (b, i) = Self::split(pos);
        (
            self.blocks[b].keys[i].assume_init_read(),
            self.blocks[b].values[i].assume_init_read(),
        )
    }

    #[inline]
    unsafe fn relocate_entry(&mut self, dest: usize, orig: usize) {
        debug_assert_ne!(dest, orig);
        let (ob, oi) = Self::split(orig);
        let (db, di) = Self::split(dest);
        let key = self.blocks[ob].keys[oi].assume_init_read();
        self.blocks[db].keys[di].write(key);
        let value = self.blocks[ob].values[oi].assume_init_read();
        self.blocks[db].values[di].write(value);
    }

    #[inline]
    unsafe fn drop_entry(&mut self, pos: usize) {
        let (b, i) = Self::split(pos);
        self.blocks[b].keys[i].assume_init_drop();
        self.blocks[b].values[i].assume_init_drop();
    }
}

impl<K, V> Drop for AobLayout<K, V> {
    fn drop(&mut self) {
        for pos in 0..self.bins {
            let (b, i) = Self::split(pos);
            if MetaWord::from_byte(self.blocks[b].meta[i]).is_empty() {
                continue;
            }
            // Safety: non-zero label means the slot holds a live element.
            unsafe {
                self.blocks[b].keys[i].assume_init_drop();
                self.blocks[b].values[i].assume_init_drop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn exercise_basic<L: BinLayout<String, u32>>() {
        let mut layout = L::with_bins(16);
        assert_eq!(layout.bins(), 16);
        for pos in 0..16 {
            assert!(layout.word(pos).is_empty());
        }

        layout.update_item(3, 1, false, 2, 0xAA00);
        unsafe { layout.write_entry(3, "three".to_string(), 33) };

        let w = layout.word(3);
        assert_eq!(w.label(), 2);
        assert_eq!(w.distance(), 1);
        assert!(!w.item_reversed());
        assert_eq!(unsafe { layout.key_at(3) }, "three");
        assert_eq!(*unsafe { layout.value_at(3) }, 33);

        *unsafe { layout.value_at_mut(3) } = 44;
        assert_eq!(*unsafe { layout.value_at(3) }, 44);

        // Relocate to an empty slot, then take from the destination.
        unsafe { layout.relocate_entry(7, 3) };
        layout.update_item(7, 0, true, 5, 0xAA00);
        layout.clear_occupancy(3);
        assert!(layout.word(3).is_empty());
        let (k, v) = unsafe { layout.take_entry(7) };
        assert_eq!(k, "three");
        assert_eq!(v, 44);
        layout.clear_occupancy(7);
    }

    fn exercise_bucket_bits<L: BinLayout<String, u32>>() {
        let mut layout = L::with_bins(8);
        layout.set_bucket_reversed(5);
        layout.set_unlucky(5);
        layout.update_item(5, 2, true, 3, 0);
        unsafe { layout.write_entry(5, "x".to_string(), 1) };

        let w = layout.word(5);
        assert!(w.bucket_reversed());
        assert!(w.unlucky());

        unsafe { layout.drop_entry(5) };
        layout.clear_occupancy(5);
        let w = layout.word(5);
        assert!(w.is_empty());
        assert!(w.bucket_reversed());
        assert!(w.unlucky());

        layout.reset_meta(5);
        let w = layout.word(5);
        assert!(!w.bucket_reversed());
        assert!(!w.unlucky());
    }

    fn exercise_grow<L: BinLayout<String, u32>>() {
        let mut layout = L::with_bins(4);
        layout.update_item(2, 0, false, 1, 0x1100);
        unsafe { layout.write_entry(2, "keep".to_string(), 9) };

        layout.grow(32);
        assert_eq!(layout.bins(), 32);
        assert_eq!(layout.word(2).label(), 1);
        assert_eq!(unsafe { layout.key_at(2) }, "keep");
        for pos in 4..32 {
            assert!(layout.word(pos).is_empty());
        }
    }

    #[test]
    fn test_soa_basic() {
        exercise_basic::<SoaLayout<String, u32>>();
        exercise_bucket_bits::<SoaLayout<String, u32>>();
        exercise_grow::<SoaLayout<String, u32>>();
    }

    #[test]
    fn test_aos_basic() {
        exercise_basic::<AosLayout<String, u32>>();
        exercise_bucket_bits::<AosLayout<String, u32>>();
        exercise_grow::<AosLayout<String, u32>>();
    }

    #[test]
    fn test_aob_basic() {
        exercise_basic::<AobLayout<String, u32>>();
        exercise_bucket_bits::<AobLayout<String, u32>>();
        exercise_grow::<AobLayout<String, u32>>();
    }

    #[test]
    fn test_prefilter_flags() {
        assert!(<SoaLayout<u64, u64> as BinLayout<u64, u64>>::PREFILTER);
        assert!(!<AosLayout<u64, u64> as BinLayout<u64, u64>>::PREFILTER);
        assert!(!<AobLayout<u64, u64> as BinLayout<u64, u64>>::PREFILTER);
    }

    #[test]
    fn test_soa_carries_tag_and_byte_layouts_do_not() {
        let mut soa = SoaLayout::<u64, u64>::with_bins(4);
        soa.update_item(0, 0, false, 1, 0xBB00);
        assert_eq!(soa.word(0).tag(), 0xBB00);

        let mut aos = AosLayout::<u64, u64>::with_bins(4);
        aos.update_item(0, 0, false, 1, 0xBB00);
        assert_eq!(aos.word(0).tag(), 0);

        let mut aob = AobLayout::<u64, u64>::with_bins(4);
        aob.update_item(0, 0, false, 1, 0xBB00);
        assert_eq!(aob.word(0).tag(), 0);
    }

    #[test]
    fn test_aob_block_boundaries() {
        let mut layout = AobLayout::<u64, u64>::with_bins(20);
        // Neighbouring bins across a block edge stay independent.
        layout.update_item(7, 1, false, 3, 0);
        unsafe { layout.write_entry(7, 77, 770) };
        layout.update_item(8, 2, true, 4, 0);
        unsafe { layout.write_entry(8, 88, 880) };

        assert_eq!(layout.word(7).label(), 3);
        assert_eq!(layout.word(8).label(), 4);
        assert_eq!(*unsafe { layout.key_at(7) }, 77);
        assert_eq!(*unsafe { layout.key_at(8) }, 88);

        unsafe { layout.relocate_entry(15, 8) };
        layout.update_item(15, 0, false, 4, 0);
        layout.clear_occupancy(8);
        assert_eq!(*unsafe { layout.key_at(15) }, 88);
    }

    struct Tally(Arc<AtomicUsize>);

    impl Drop for Tally {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn exercise_drop<L: BinLayout<Tally, Tally>>() {
        let drops = Arc::new(AtomicUsize::new(0));
        {
            let mut layout = L::with_bins(8);
            for pos in [1usize, 4, 6] {
                layout.update_item(pos, 0, false, 1, 0);
                unsafe {
                    layout.write_entry(pos, Tally(drops.clone()), Tally(drops.clone()));
                }
            }
            // One entry erased by hand, the rest dropped with the layout.
            unsafe { layout.drop_entry(4) };
            layout.clear_occupancy(4);
            assert_eq!(drops.load(Ordering::Relaxed), 2);
        }
        assert_eq!(drops.load(Ordering::Relaxed), 6);
    }

    #[test]
    fn test_drop_runs_destructors() {
        exercise_drop::<SoaLayout<Tally, Tally>>();
        exercise_drop::<AosLayout<Tally, Tally>>();
        exercise_drop::<AobLayout<Tally, Tally>>();
    }
}
