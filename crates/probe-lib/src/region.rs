//! Memory region under test
//!
//! A contiguous array of 8-byte signed words. The region is allocated and
//! written once by the caller so every page is physically backed before
//! any placement or sampling happens.

use anyhow::{bail, Context, Result};

/// Bytes per mebibyte
pub const MIB: usize = 1024 * 1024;

/// Size of one element in bytes
pub const WORD_SIZE: usize = std::mem::size_of::<i64>();

/// Owned, fixed-size array of words
pub struct MemoryRegion {
    data: Vec<i64>,
}

impl MemoryRegion {
    /// Allocate a region of `size_mb` mebibytes and fault in every page
    pub fn allocate(size_mb: usize) -> Result<Self> {
        let elements = size_mb
            .checked_mul(MIB)
            .context("Region size overflows the address space")?
            / WORD_SIZE;
        Self::with_elements(elements)
    }

    /// Allocate a region of exactly `elements` words and fault in every page
    pub fn with_elements(elements: usize) -> Result<Self> {
        if elements == 0 {
            bail!("Region must contain at least one element");
        }

        let mut data = Vec::new();
        data.try_reserve_exact(elements)
            .with_context(|| format!("Failed to allocate {} elements", elements))?;
        data.extend((0..elements).map(|i| (i % 100) as i64));

        Ok(Self { data })
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size of the region in bytes
    pub fn byte_size(&self) -> usize {
        self.data.len() * WORD_SIZE
    }

    /// Virtual address of the first element
    pub fn base_addr(&self) -> usize {
        self.data.as_ptr() as usize
    }

    /// Virtual address of element `index`
    pub fn addr_of(&self, index: usize) -> usize {
        self.base_addr() + index * WORD_SIZE
    }

    /// Page-aligned start of the page holding the first element
    pub fn first_page_addr(&self, page_size: usize) -> usize {
        let base = self.base_addr();
        base - base % page_size
    }

    /// Number of `page_size` pages the region touches
    ///
    /// Equals `ceil(byte_size / page_size)` when the base is page aligned and
    /// may be one more when it is not.
    pub fn page_count(&self, page_size: usize) -> usize {
        let end = self.base_addr() + self.byte_size();
        (end - self.first_page_addr(page_size)).div_ceil(page_size)
    }

    /// One page-aligned address per page the region touches
    pub fn page_addrs(&self, page_size: usize) -> impl Iterator<Item = usize> {
        let start = self.first_page_addr(page_size);
        (0..self.page_count(page_size)).map(move |i| start + i * page_size)
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [i64] {
        &mut self.data
    }
}

impl std::fmt::Debug for MemoryRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRegion")
            .field("base", &format_args!("{:#x}", self.base_addr()))
            .field("elements", &self.len())
            .field("bytes", &self.byte_size())
            .finish()
    }
}
