use std::collections::BTreeSet;

use crate::NormalizeOptions;

/// Over-indented license whose second line drifts further right.
pub const RAGGED_LICENSE: &str =
	"---\ntitle: X\nlicense: |\n    MIT\n      Copyright 2024\n---\nbody\n";

pub const RAGGED_LICENSE_NORMALIZED: &str =
	"---\ntitle: X\nlicense: |\n  MIT\n  Copyright 2024\n---\nbody\n";

/// Wildly indented first line followed by a shallower one. Not valid YAML
/// until normalized.
pub const BROKEN_LICENSE: &str = "---\ntitle: Barchart\nlicense: |\n          Licensed under \
                                  MIT.\n  See LICENSE for details.\nauthor: Bob\n---\n\n# Barchart\n";

pub const BROKEN_LICENSE_NORMALIZED: &str = "---\ntitle: Barchart\nlicense: |\n  Licensed under \
                                             MIT.\n  See LICENSE for details.\nauthor: \
                                             Bob\n---\n\n# Barchart\n";

/// Both default keys, one after the other.
pub const CONSECUTIVE_BLOCKS: &str =
	"---\nlicense: |\n        MIT\ndescription: |\n    A chart.\n      With axes.\n---\n";

pub const CONSECUTIVE_BLOCKS_NORMALIZED: &str =
	"---\nlicense: |\n  MIT\ndescription: |\n  A chart.\n  With axes.\n---\n";

pub const NO_FRONTMATTER: &str = "# Title\n\nlicense: |\n      MIT\n---\n";

pub fn license_only() -> NormalizeOptions {
	NormalizeOptions {
		block_scalar_keys: BTreeSet::from(["license".to_string()]),
		..NormalizeOptions::default()
	}
}

pub fn lines(input: &str) -> Vec<&str> {
	input.lines().collect()
}
