//! Source map for bidirectional mapping between memory addresses and source lines

/// Bidirectional mapping between binary and source locations
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    /// Forward map: instruction address → source location
    /// Sorted by address for binary search
    address_to_source: Vec<(u16, SourceLocation)>,

    /// Reverse map: source line → instruction address ranges
    /// Sorted by line number for binary search
    source_to_address: Vec<(usize, AddressRange)>,
}

/// A location in source code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,

    /// Column where the statement starts (0-indexed)
    pub column: usize,

    /// Length of the statement in source characters
    pub length: usize,
}

/// A range of instruction addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    /// Starting address (inclusive)
    pub start: u16,

    /// Ending address (exclusive, may wrap to 0 at the top of memory)
    pub end: u16,
}

impl SourceMap {
    /// Create a new empty source map
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `size` bytes starting at `address` came from `location`.
    pub fn add_mapping(&mut self, address: u16, size: u16, location: SourceLocation) {
        self.address_to_source.push((address, location));
        self.source_to_address.push((
            location.line,
            AddressRange {
                start: address,
                end: address.wrapping_add(size),
            },
        ));
    }

    /// Get source location for a given instruction address
    pub fn get_source_location(&self, address: u16) -> Option<SourceLocation> {
        self.address_to_source
            .binary_search_by_key(&address, |(addr, _)| *addr)
            .ok()
            .map(|idx| self.address_to_source[idx].1)
    }

    /// Source line of the instruction starting at `address`.
    pub fn line_at(&self, address: u16) -> Option<usize> {
        self.get_source_location(address).map(|loc| loc.line)
    }

    /// Get address range for a given source line
    pub fn get_address_range(&self, line: usize) -> Option<AddressRange> {
        self.source_to_address
            .binary_search_by_key(&line, |(l, _)| *l)
            .ok()
            .map(|idx| self.source_to_address[idx].1)
    }

    /// Number of mapped instructions.
    pub fn len(&self) -> usize {
        self.address_to_source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.address_to_source.is_empty()
    }

    /// Finalize the source map (sort for binary search)
    ///
    /// A later mapping for the same address replaces an earlier one, so code
    /// overwritten after an `.org` is attributed to the line that wrote last.
    pub fn finalize(&mut self) {
        self.address_to_source.reverse();
        self.address_to_source.sort_by_key(|(addr, _)| *addr);
        self.address_to_source.dedup_by_key(|(addr, _)| *addr);
        self.source_to_address.sort_by_key(|(line, _)| *line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(line: usize, column: usize) -> SourceLocation {
        SourceLocation {
            line,
            column,
            length: 8,
        }
    }

    #[test]
    fn test_source_map_add_lookup() {
        let mut map = SourceMap::new();
        map.add_mapping(0x8002, 3, at(2, 4));
        map.add_mapping(0x8000, 2, at(1, 0));
        map.finalize();

        let loc = map.get_source_location(0x8000).unwrap();
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 0);

        assert_eq!(map.line_at(0x8002), Some(2));
        assert!(map.get_source_location(0x9000).is_none());
        assert_eq!(
            map.get_address_range(2),
            Some(AddressRange {
                start: 0x8002,
                end: 0x8005
            })
        );
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_later_mapping_wins() {
        let mut map = SourceMap::new();
        map.add_mapping(0x0600, 1, at(1, 0));
        map.add_mapping(0x0600, 1, at(5, 0));
        map.finalize();
        assert_eq!(map.line_at(0x0600), Some(5));
        assert_eq!(map.len(), 1);
    }
}
