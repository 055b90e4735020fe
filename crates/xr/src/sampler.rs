use crate::pose::{
    ControllerPair, ControllerPose, Handedness, InputSource, ReferenceSpace, TargetRayMode,
    XrFrame, XrSession,
};

fn find_source(sources: &[InputSource], hand: Handedness) -> Option<&InputSource> {
    sources.iter().find(|s| {
        s.handedness == Some(hand) && s.target_ray_mode == TargetRayMode::TrackedPointer
    })
}

fn pose_for<F: XrFrame + ?Sized>(
    source: &InputSource,
    hand: Handedness,
    frame: &F,
    reference: ReferenceSpace,
) -> Option<ControllerPose> {
    // Grip space tracks the physical hand; the target ray sits at the pointer tip.
    let position = source
        .grip_space
        .and_then(|grip| frame.pose(grip, reference))
        .or_else(|| frame.pose(source.target_ray_space, reference))?;
    position
        .is_finite()
        .then(|| ControllerPose::tracked(hand, position))
}

/// Reads both hand controllers for the current frame.
///
/// Missing session, frame or reference space gives an empty pair; a hand with
/// no tracked-pointer source or no pose this frame comes back as `None`.
pub fn sample<S, F>(
    session: Option<&S>,
    frame: Option<&F>,
    reference: Option<ReferenceSpace>,
) -> ControllerPair
where
    S: XrSession + ?Sized,
    F: XrFrame + ?Sized,
{
    let (Some(session), Some(frame), Some(reference)) = (session, frame, reference) else {
        return ControllerPair::default();
    };
    let sources = session.input_sources();
    let read = |hand| {
        find_source(sources, hand).and_then(|src| pose_for(src, hand, frame, reference))
    };
    ControllerPair {
        left: read(Handedness::Left),
        right: read(Handedness::Right),
    }
}
