// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sample models shared by the unit tests

use cityjson_lite_model::CityModel;
use serde_json::{json, Value};

fn model(document: Value) -> CityModel {
    cityjson_lite_parser::parse(document.to_string().as_bytes()).unwrap()
}

/// One generic object: a cube of six faces at LoD1
pub fn two_cubes() -> CityModel {
    model(json!({
        "CityObjects": {
            "id-1": {
                "geometry": [{
                    "boundaries": [
                        [[0, 1, 2, 3]], [[7, 4, 0, 3]], [[4, 5, 1, 0]],
                        [[5, 6, 2, 1]], [[3, 2, 6, 7]], [[6, 5, 4, 7]]
                    ],
                    "lod": 1,
                    "type": "MultiSurface"
                }],
                "type": "GenericCityObject"
            }
        },
        "type": "CityJSON",
        "version": "0.9",
        "vertices": [
            [1.0, 0.0, 1.0], [0.0, 1.0, 1.0], [-1.0, 0.0, 1.0], [0.0, -1.0, 1.0],
            [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [-1.0, 0.0, 0.0], [0.0, -1.0, 0.0]
        ],
        "metadata": {"geographicalExtent": [-1.0, -1.0, 0.0, 1.0, 1.0, 1.0]}
    }))
}

/// Two buildings with attributes and no geometry
pub fn citymodel_with_attributes() -> CityModel {
    model(json!({
        "type": "CityJSON",
        "version": "0.9",
        "CityObjects": {
            "id-1": {"type": "Building", "attributes": {"attribute1": 1, "attribute2": 2}},
            "id-2": {"type": "Building", "attributes": {"attribute1": 1, "attribute3": 2}}
        },
        "vertices": []
    }))
}

/// A building and a road, each with a LoD1 and a LoD2 geometry
///
/// The LoD2 geometries carry semantics: ground, roof and wall on the
/// building, one unlabelled polygon and one traffic area on the road.
pub fn buildings_and_roads() -> CityModel {
    model(json!({
        "type": "CityJSON",
        "version": "1.1",
        "metadata": {"referenceSystem": "https://www.opengis.net/def/crs/EPSG/0/7415"},
        "CityObjects": {
            "b1": {
                "type": "Building",
                "attributes": {"height": 10.5, "function": "residential"},
                "geometry": [
                    {"type": "MultiSurface", "lod": 1, "boundaries": [[[0, 1, 2, 3]]]},
                    {
                        "type": "MultiSurface",
                        "lod": 2,
                        "boundaries": [[[0, 3, 2, 1]], [[4, 5, 6, 7]], [[0, 1, 5, 4]]],
                        "semantics": {
                            "surfaces": [
                                {"type": "GroundSurface"},
                                {"type": "RoofSurface", "slope": 30},
                                {"type": "WallSurface"}
                            ],
                            "values": [0, 1, 2]
                        }
                    }
                ]
            },
            "r1": {
                "type": "Road",
                "attributes": {"lanes": 2},
                "geometry": [
                    {"type": "MultiSurface", "lod": 1, "boundaries": [[[8, 9, 10, 11]]]},
                    {
                        "type": "MultiSurface",
                        "lod": 2,
                        "boundaries": [[[8, 9, 10, 11]], [[8, 10, 11]]],
                        "semantics": {
                            "surfaces": [{"type": "TrafficArea", "material": "asphalt"}],
                            "values": [null, 0]
                        }
                    }
                ]
            }
        },
        "vertices": [
            [0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [10.0, 10.0, 0.0], [0.0, 10.0, 0.0],
            [0.0, 0.0, 6.0], [10.0, 0.0, 6.0], [10.0, 10.0, 6.0], [0.0, 10.0, 6.0],
            [20.0, 0.0, 0.0], [30.0, 0.0, 0.0], [30.0, 4.0, 0.0], [20.0, 4.0, 0.0]
        ]
    }))
}

/// Three generations: grandparent, parent and child
pub fn family() -> CityModel {
    let face = json!([{"type": "MultiSurface", "lod": 1, "boundaries": [[[0, 1, 2, 3]]]}]);
    model(json!({
        "type": "CityJSON",
        "version": "1.1",
        "CityObjects": {
            "grandparent": {
                "type": "Building",
                "attributes": {"owner": "grandparent", "city": "Delft", "name": "gp"},
                "children": ["parent"],
                "geometry": face.clone()
            },
            "parent": {
                "type": "Building",
                "attributes": {"owner": "parent", "name": "p", "roof": "flat"},
                "parents": ["grandparent"],
                "children": ["child"],
                "geometry": face.clone()
            },
            "child": {
                "type": "BuildingPart",
                "attributes": {"name": "child", "roof": null},
                "parents": ["parent"],
                "geometry": face.clone()
            }
        },
        "vertices": [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]]
    }))
}
