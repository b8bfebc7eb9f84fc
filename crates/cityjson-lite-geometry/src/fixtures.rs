// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sample geometries shared by the unit tests

use crate::VertexCache;
use serde_json::{json, Value};

/// Five surfaces, one without semantics
pub fn multisurface_with_semantics() -> Value {
    json!({
        "type": "MultiSurface",
        "lod": 2,
        "boundaries": [
            [[0, 3, 2, 1]], [[4, 5, 6, 7]], [[0, 1, 5, 4]], [[0, 2, 3, 8]], [[10, 12, 23, 48]]
        ],
        "semantics": {
            "surfaces": [
                {"type": "WallSurface", "slope": 33.4, "children": [2]},
                {"type": "RoofSurface", "slope": 66.6},
                {"type": "Door", "parent": 0, "colour": "blue"}
            ],
            "values": [0, 0, null, 1, 2]
        }
    })
}

/// Two solids of one shell each; the second has no semantics
pub fn solid_with_semantics() -> Value {
    json!({
        "type": "CompositeSolid",
        "lod": 2,
        "boundaries": [
            [
                [[[0, 3, 2, 1, 22]], [[4, 5, 6, 7]], [[0, 1, 5, 4]], [[1, 2, 6, 5]]]
            ],
            [
                [[[666, 667, 668]], [[74, 75, 76]], [[880, 881, 885]], [[111, 122, 226]]]
            ]
        ],
        "semantics": {
            "surfaces": [{"type": "RoofSurface"}, {"type": "WallSurface"}],
            "values": [[[0, 1, 1, null]], [null]]
        }
    })
}

/// Two solids, the first with an inner shell
pub fn composite_solid() -> Value {
    json!({
        "type": "CompositeSolid",
        "lod": 3,
        "boundaries": [
            [
                [[[0, 3, 2, 1, 22]], [[4, 5, 6, 7]], [[0, 1, 5, 4]], [[1, 2, 6, 5]]],
                [[[240, 243, 124]], [[244, 246, 724]], [[34, 414, 45]], [[111, 246, 5]]]
            ],
            [
                [[[666, 667, 668]], [[74, 75, 76]], [[880, 881, 885]], [[111, 122, 226]]]
            ]
        ]
    })
}

/// Cache large enough for every index used above; vertex `i` is `(i, 0, 0)`
pub fn vertex_cache() -> VertexCache {
    let vertices: Vec<[f64; 3]> = (0..1000).map(|i| [i as f64, 0.0, 0.0]).collect();
    VertexCache::from_vertices(&vertices, None)
}
