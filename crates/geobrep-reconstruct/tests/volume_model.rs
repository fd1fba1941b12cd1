//! Reconstruction of models described by a tetrahedral mesh.

#![allow(clippy::unwrap_used)]

mod common;

use approx::assert_relative_eq;
use common::*;
use geobrep_reconstruct::{
    reconstruct_from_volume, ReconstructError, ReconstructionParams, RegionSeed, VolumeVertex,
};
use geobrep_topo::{CollectionKind, Incidence, Inspection, Region};

#[test]
fn test_box_blocks_are_discovered() {
    let input = volume_input(&box_patches(), &VolumeOptions::default());
    let params = ReconstructionParams::default();
    let mut reconstruction = reconstruct_from_volume(&input, &params).unwrap();
    {
        let model = &reconstruction.model;
        assert_eq!(model.surfaces.len(), 11);
        assert_eq!(model.blocks.len(), 2);
        assert_eq!(model.corners.len(), 12);
        assert_eq!(model.lines.len(), 20);
        assert_eq!(model.region_boundaries(Region::Universe).len(), 10);
        assert_eq!(model.nb_surface_block_relations(Incidence::Boundary), 12);
        assert!(!model.needs_inspection());

        let lower = block_named(model, "block_1");
        assert_eq!(model.blocks[lower].polyhedra.len(), NX * NY * 2 * 6);
        assert!(model.block_boundaries(lower).contains(&surface_named(model, "bottom")));
        assert!(!model.block_boundaries(lower).contains(&surface_named(model, "top")));
    }

    let sides = reconstruction.orient(&params).unwrap();
    let model = &reconstruction.model;
    for (block, _) in &model.blocks {
        assert_relative_eq!(block_volume(model, &sides, block), 2.0, epsilon = 1e-9);
    }
    assert_relative_eq!(universe_volume(model, &sides), 4.0, epsilon = 1e-9);
}

#[test]
fn test_flipped_surfaces_still_enclose_positive_volumes() {
    let options = VolumeOptions {
        flipped: vec![TOP, HORIZON, 3, 8],
        ..VolumeOptions::default()
    };
    let params = ReconstructionParams::default();
    let mut reconstruction = reconstruct_from_volume(&volume_input(&box_patches(), &options), &params).unwrap();
    let sides = reconstruction.orient(&params).unwrap();
    let model = &reconstruction.model;
    for (block, _) in &model.blocks {
        assert_relative_eq!(block_volume(model, &sides, block), 2.0, epsilon = 1e-9);
    }
    assert_relative_eq!(universe_volume(model, &sides), 4.0, epsilon = 1e-9);
}

#[test]
fn test_shared_vertices_cluster_with_their_original() {
    let options = VolumeOptions {
        shared_horizon: true,
        ..VolumeOptions::default()
    };
    let input = volume_input(&box_patches(), &options);
    assert!(input
        .vertices
        .iter()
        .any(|v| matches!(v, VolumeVertex::Shared(_))));
    let params = ReconstructionParams::default();
    let mut reconstruction = reconstruct_from_volume(&input, &params).unwrap();
    let model = &reconstruction.model;
    assert_eq!(model.blocks.len(), 2);
    assert_eq!(model.corners.len(), 12);
    assert_eq!(model.lines.len(), 20);
    let horizon = surface_named(model, "horizon");
    for (block, _) in &model.blocks {
        assert_eq!(model.surface_block_relation(horizon, block), Some(Incidence::Boundary));
    }
    assert!(!model.needs_inspection());

    let sides = reconstruction.orient(&params).unwrap();
    let model = &reconstruction.model;
    for (block, _) in &model.blocks {
        assert_relative_eq!(block_volume(model, &sides, block), 2.0, epsilon = 1e-9);
    }
}

#[test]
fn test_region_seeds_pick_the_requested_side() {
    let mut input = volume_input(&box_patches(), &VolumeOptions::default());
    // The horizon's first triangle faces up.
    input.regions = vec![
        RegionSeed {
            name: "upper".into(),
            surface: HORIZON,
            side: true,
        },
        RegionSeed {
            name: "lower".into(),
            surface: HORIZON,
            side: false,
        },
    ];
    let model = reconstruct_from_volume(&input, &ReconstructionParams::default())
        .unwrap()
        .model;
    let upper = block_named(&model, "upper");
    let lower = block_named(&model, "lower");
    assert!(model.block_boundaries(upper).contains(&surface_named(&model, "top")));
    assert!(model.block_boundaries(lower).contains(&surface_named(&model, "bottom")));
}

#[test]
fn test_seed_outside_the_mesh_fails() {
    let mut input = volume_input(&box_patches(), &VolumeOptions::default());
    input.regions = vec![RegionSeed {
        name: "below".into(),
        surface: BOTTOM,
        side: false,
    }];
    let err = reconstruct_from_volume(&input, &ReconstructionParams::default()).unwrap_err();
    assert!(matches!(
        err,
        ReconstructError::StartingFacetNotFound { ref region, ref surface } if region == "below" && surface == "bottom"
    ));
}

#[test]
fn test_seed_in_built_block_fails() {
    let mut input = volume_input(&box_patches(), &VolumeOptions::default());
    input.regions = vec![
        RegionSeed {
            name: "a".into(),
            surface: BOTTOM,
            side: true,
        },
        RegionSeed {
            name: "b".into(),
            surface: HORIZON,
            side: false,
        },
    ];
    let err = reconstruct_from_volume(&input, &ReconstructionParams::default()).unwrap_err();
    assert!(matches!(err, ReconstructError::InvalidInput(_)));
}

#[test]
fn test_partial_fault_is_internal_and_flagged() {
    let mut patches = box_patches();
    patches.push(partial_fault());
    let input = volume_input(&patches, &VolumeOptions::default());
    let params = ReconstructionParams::default();
    let mut reconstruction = reconstruct_from_volume(&input, &params).unwrap();
    let model = &reconstruction.model;

    assert_eq!(model.blocks.len(), 2);
    assert_eq!(model.nb_collections_of_kind(CollectionKind::Fault), 1);
    let fault = surface_named(model, "fault");
    let lower = block_named(model, "block_1");
    assert_eq!(model.block_internals(lower), vec![fault]);
    assert_eq!(model.blocks_of_surface(fault), vec![(lower, Incidence::Internal)]);

    // The fault ends on three walls without cutting them.
    let wall = surface_named(model, "wall_x0_lower");
    assert!(model
        .inspection()
        .entries()
        .iter()
        .any(|entry| matches!(entry, Inspection::UncutInternalLine { surface, .. } if *surface == wall)));
    assert!(model
        .lines_of_surface(wall)
        .iter()
        .any(|(_, incidence)| *incidence == Incidence::Internal));

    // Internal surfaces stay out of the block shell.
    let sides = reconstruction.orient(&params).unwrap();
    let model = &reconstruction.model;
    assert_eq!(sides.block_side(lower, fault), None);
    assert_relative_eq!(block_volume(model, &sides, lower), 2.0, epsilon = 1e-9);
}

#[test]
fn test_non_conformal_surface_is_flagged() {
    let options = VolumeOptions {
        anti_diagonal: vec![BOTTOM],
        ..VolumeOptions::default()
    };
    let input = volume_input(&box_patches(), &options);
    let model = reconstruct_from_volume(&input, &ReconstructionParams::default())
        .unwrap()
        .model;
    let bottom = surface_named(&model, "bottom");
    let lower = block_named(&model, "block_1");
    let entries = model.inspection().entries();
    assert_eq!(
        entries
            .iter()
            .filter(|e| matches!(e, Inspection::NonConformalTriangle { surface, .. } if *surface == bottom))
            .count(),
        2
    );
    assert!(entries.contains(&Inspection::NonConformalBlock {
        surface: bottom,
        block: lower,
        facets: NX * NY * 2 - 2,
        triangles: NX * NY * 2,
    }));
    // Best effort keeps the bottom as a boundary.
    assert_eq!(model.surface_block_relation(bottom, lower), Some(Incidence::Boundary));
    assert!(model.needs_inspection());
}

#[test]
fn test_invalid_shared_reference() {
    let mut input = volume_input(&box_patches(), &VolumeOptions::default());
    input.vertices.push(VolumeVertex::Shared(input.vertices.len() + 3));
    let err = reconstruct_from_volume(&input, &ReconstructionParams::default()).unwrap_err();
    assert!(matches!(err, ReconstructError::InvalidReference { what: "shared vertex", .. }));
}
