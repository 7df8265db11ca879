//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Grid iterators

use crate::grid::{TileKey, TileRange};

/// Level-by-level iterator
pub struct GridIterator {
    z: u8,
    x: i32,
    y: i32,
    maxz: u8,
    /// Tile limits indexed by zoom level
    limits: Vec<TileRange>,
    finished: bool,
}

impl GridIterator {
    pub fn new(minz: u8, maxz: u8, limits: Vec<TileRange>) -> GridIterator {
        if minz <= maxz && limits.len() > minz as usize {
            let limit = limits[minz as usize];
            let maxz = std::cmp::min(maxz, (limits.len() - 1) as u8);
            let mut iter = GridIterator {
                z: minz,
                x: limit.left,
                y: limit.bottom,
                maxz,
                limits,
                finished: false,
            };
            iter.skip_empty_levels();
            iter
        } else {
            // Return "empty" iterator for invalid parameters
            GridIterator {
                z: 0,
                x: 0,
                y: 0,
                maxz: 0,
                limits: Vec::new(),
                finished: true,
            }
        }
    }

    fn skip_empty_levels(&mut self) {
        while self.limits[self.z as usize].is_empty() {
            if self.z >= self.maxz {
                self.finished = true;
                return;
            }
            self.z += 1;
            let limit = &self.limits[self.z as usize];
            self.x = limit.left;
            self.y = limit.bottom;
        }
    }
}

impl Iterator for GridIterator {
    type Item = TileKey;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let current = TileKey::new(self.z, self.x, self.y);
        let limit = &self.limits[self.z as usize];
        if self.y < limit.top {
            self.y += 1;
        } else if self.x < limit.right {
            self.x += 1;
            self.y = limit.bottom;
        } else if self.z < self.maxz {
            self.z += 1;
            let limit = &self.limits[self.z as usize];
            self.x = limit.left;
            self.y = limit.bottom;
            self.skip_empty_levels();
        } else {
            self.finished = true;
        }
        Some(current)
    }
}

#[test]
fn test_world_iter() {
    use crate::grid::{tile_limits, WORLD_EXTENT};
    let limits = (0..=1).map(|z| tile_limits(&WORLD_EXTENT, z)).collect();
    let griditer = GridIterator::new(0, 1, limits);
    let cells = griditer
        .map(|k| (k.zoom, k.x, k.y))
        .collect::<Vec<_>>();
    assert_eq!(
        cells,
        vec![
            (0, 0, 0),
            (0, 1, 0),
            (1, 0, 0),
            (1, 0, 1),
            (1, 1, 0),
            (1, 1, 1),
            (1, 2, 0),
            (1, 2, 1),
            (1, 3, 0),
            (1, 3, 1)
        ]
    );

    let limits = (0..=1).map(|z| tile_limits(&WORLD_EXTENT, z)).collect();
    let griditer = GridIterator::new(0, 0, limits);
    assert_eq!(griditer.count(), 2);
}

#[test]
fn test_bad_params() {
    use crate::grid::{tile_limits, WORLD_EXTENT};

    // missing tile_limits
    let griditer = GridIterator::new(0, 10, Vec::new());
    assert_eq!(griditer.count(), 0);

    // minz > maxz
    let limits = (0..=3).map(|z| tile_limits(&WORLD_EXTENT, z)).collect();
    let griditer = GridIterator::new(3, 2, limits);
    assert_eq!(griditer.count(), 0);

    // maxz >= limits.len()
    let griditer = GridIterator::new(
        0,
        2,
        vec![
            TileRange {
                left: 0,
                right: 0,
                bottom: 0,
                top: 0,
            },
            TileRange {
                left: 0,
                right: 1,
                bottom: 0,
                top: 1,
            },
        ],
    );
    let cells = griditer
        .map(|k| (k.zoom, k.x, k.y))
        .collect::<Vec<_>>();
    assert_eq!(
        cells,
        vec![(0, 0, 0), (1, 0, 0), (1, 0, 1), (1, 1, 0), (1, 1, 1)]
    );

    // empty levels are skipped
    let griditer = GridIterator::new(
        0,
        2,
        vec![
            TileRange {
                left: 1,
                right: 0,
                bottom: 0,
                top: 0,
            },
            TileRange {
                left: 0,
                right: 0,
                bottom: 0,
                top: 0,
            },
            TileRange {
                left: 0,
                right: 0,
                bottom: 1,
                top: 0,
            },
        ],
    );
    let cells = griditer
        .map(|k| (k.zoom, k.x, k.y))
        .collect::<Vec<_>>();
    assert_eq!(cells, vec![(1, 0, 0)]);
}
