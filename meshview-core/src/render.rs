//! Per-frame transform setup and draw dispatch.

use log::debug;
use nalgebra::Vector3;

use crate::context::AppContext;
use crate::device::RenderDevice;
use crate::error::DeviceError;
use crate::program::ProgramSpec;
use crate::projection::Camera;
use crate::selection::Selection;
use crate::transform::{RotationState, Transform, TransformTriple};

/// What happened to a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Drawn { draw_calls: usize },
    /// `begin_scene` failed; nothing was drawn but the frame was still presented.
    Skipped,
}

/// World/view/projection for one placed mesh at `elapsed_secs`.
pub fn setup_transforms(
    program: &ProgramSpec,
    camera: &Camera,
    offset: &Vector3<f32>,
    elapsed_secs: f32,
) -> TransformTriple {
    let rotation = RotationState::yaw(program.spin_angle(elapsed_secs));
    TransformTriple {
        world: Transform::world_matrix(&rotation, program.scale, offset),
        view: camera.view_matrix(),
        projection: camera.projection_matrix(),
    }
}

/// Clear, draw every subset of each selected mesh, and present.
pub fn render_frame<D: RenderDevice>(
    context: &mut AppContext<D>,
    elapsed_secs: f32,
) -> Result<FrameOutcome, DeviceError> {
    let aspect = context.device().aspect();
    let selection = context.selection.current();
    let placements = context.program.placements(selection);
    let camera = context.program.camera.with_aspect(aspect);
    let clear_color = context.program.clear_color;

    let caption = match selection {
        Selection::All => "all meshes".to_string(),
        Selection::Single(i) => context
            .meshes()
            .get(i)
            .map(|m| m.name.clone())
            .unwrap_or_default(),
    };

    let draws: Vec<_> = placements
        .iter()
        .filter_map(|(index, offset)| {
            context
                .meshes()
                .get(*index)
                .map(|m| (m.id, m.subset_count, *offset))
        })
        .collect();
    let transforms: Vec<TransformTriple> = draws
        .iter()
        .map(|(_, _, offset)| setup_transforms(&context.program, &camera, offset, elapsed_secs))
        .collect();

    let device = context.device_mut();
    device.clear(clear_color);
    device.set_caption(&caption);

    let outcome = match device.begin_scene() {
        Ok(()) => {
            let mut draw_calls = 0;
            for ((id, subset_count, _), triple) in draws.iter().zip(&transforms) {
                device.set_transforms(triple);
                for subset in 0..*subset_count {
                    device.draw_subset(*id, subset);
                    draw_calls += 1;
                }
            }
            device.end_scene();
            FrameOutcome::Drawn { draw_calls }
        }
        Err(e) => {
            debug!("dropping frame: {}", e);
            FrameOutcome::Skipped
        }
    };

    device.present()?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::recording::{count, Call, RecordingDevice};
    use crate::device::{MeshId, Rgb};
    use crate::geometry::{Mesh, Triangle};
    use crate::selection::Trigger;
    use nalgebra::Point3;

    fn mesh_with_subsets(name: &str, subsets: usize) -> Mesh {
        let tri = Triangle::from_positions(
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        Mesh::from_subsets(name, (0..subsets).map(|_| vec![tri.clone()]).collect())
    }

    fn chess_context() -> (AppContext<RecordingDevice>, crate::device::recording::CallLog) {
        let (device, log) = RecordingDevice::new();
        let mut context = AppContext::new(device, ProgramSpec::chess());
        context.adopt(mesh_with_subsets("pawn", 2));
        context.adopt(mesh_with_subsets("queen", 3));
        context.adopt(mesh_with_subsets("rook", 1));
        (context, log)
    }

    #[test]
    fn test_all_draws_each_mesh_with_its_own_subset_count() {
        let (mut context, log) = chess_context();
        let outcome = render_frame(&mut context, 0.0).unwrap();
        assert_eq!(outcome, FrameOutcome::Drawn { draw_calls: 6 });
        assert_eq!(count(&log, |c| *c == Call::Draw(MeshId::new(1), 2)), 1);
        assert_eq!(count(&log, |c| *c == Call::Transforms), 3);
        assert_eq!(count(&log, |c| *c == Call::Clear(Rgb::BLUE)), 1);
    }

    #[test]
    fn test_single_selection_draws_only_that_mesh() {
        let (mut context, log) = chess_context();
        context.selection.apply(Trigger::Advance);
        context.selection.apply(Trigger::Advance);
        assert_eq!(context.selection.current(), Selection::Single(1));

        log.borrow_mut().clear();
        let outcome = render_frame(&mut context, 0.0).unwrap();
        assert_eq!(outcome, FrameOutcome::Drawn { draw_calls: 3 });
        assert_eq!(count(&log, |c| matches!(c, Call::Draw(id, _) if *id == MeshId::new(1))), 3);
        assert_eq!(count(&log, |c| matches!(c, Call::Draw(..))), 3);

        let world = context.device().last_transforms.unwrap().world;
        assert!(world.column(3).xyz().norm() < 1e-6);
    }

    #[test]
    fn test_failed_begin_scene_skips_drawing_but_presents() {
        let (mut context, log) = chess_context();
        context.device_mut().fail_begin = true;
        log.borrow_mut().clear();

        let outcome = render_frame(&mut context, 0.0).unwrap();
        assert_eq!(outcome, FrameOutcome::Skipped);
        assert_eq!(count(&log, |c| matches!(c, Call::Draw(..))), 0);
        assert_eq!(count(&log, |c| *c == Call::EndScene), 0);
        assert_eq!(count(&log, |c| *c == Call::Present), 1);
    }

    #[test]
    fn test_spin_follows_elapsed_time() {
        let program = ProgramSpec::chess();
        let camera = program.camera;
        let still = setup_transforms(&program, &camera, &Vector3::zeros(), 0.0);
        let turned = setup_transforms(&program, &camera, &Vector3::zeros(), 1.5);
        assert_ne!(still.world, turned.world);
        assert_eq!(still.view, turned.view);

        let shapes = ProgramSpec::shapes();
        let a = setup_transforms(&shapes, &shapes.camera, &Vector3::zeros(), 0.0);
        let b = setup_transforms(&shapes, &shapes.camera, &Vector3::zeros(), 3.0);
        assert_eq!(a.world, b.world);
    }
}
