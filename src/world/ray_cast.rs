use std::marker::PhantomData;

use crate::body::Body;
use crate::collision::Collision;
use crate::engine::Engine;
use crate::math::Vec3;
use crate::relay::Relay;

use super::NoPrefilter;

/// RayCast hit.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub body: Body,
    pub collision: Collision,
    pub position: Vec3,
    pub normal: Vec3,
    pub collision_id: i64,
    pub intersect_param: f32,
}

/// What the engine should do with the rest of the ray after a hit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RayControl {
    /// Stop the scan.
    Stop,
    /// Keep scanning, ignoring hits farther than the given parameter.
    Clip(f32),
    /// Keep scanning the whole ray.
    Continue,
}

impl RayControl {
    pub fn into_param(self) -> f32 {
        match self {
            RayControl::Stop => 0.0,
            RayControl::Clip(param) => param,
            RayControl::Continue => 1.0,
        }
    }
}

/// Ray-cast algorithm
pub trait RayCastAlgorithm {
    /// Algorithm-specific params.
    type Params;
    /// RayCast hit(s).
    type Result;
    fn ray_cast<E: Engine>(relay: &Relay<E>, p0: &Vec3, p1: &Vec3, params: Self::Params) -> Self::Result;
}

/// Return the closest hit
pub enum ClosestHit {}
/// Return all intersecting hits.
pub enum AllHits {}
/// Return the N closest hits, sorted by distance.
pub enum NClosestHits {}

/// Parameters for the user-defined RayCasting algorithm
pub struct CustomParams<F, P> {
    pub filter: F,
    pub prefilter: P,
}

/// User-defined algorithm.
pub struct Custom<F, P>(PhantomData<fn(F, P)>);

impl RayCastAlgorithm for ClosestHit {
    type Params = ();
    type Result = Option<RayHit>;

    fn ray_cast<E: Engine>(relay: &Relay<E>, p0: &Vec3, p1: &Vec3, _: ()) -> Self::Result {
        let mut closest: Option<RayHit> = None;
        relay.ray_cast_raw(
            p0,
            p1,
            |hit: RayHit| {
                if closest.map_or(true, |c| hit.intersect_param < c.intersect_param) {
                    closest = Some(hit);
                }
                RayControl::Clip(closest.map_or(hit.intersect_param, |c| c.intersect_param))
            },
            None::<NoPrefilter>,
            0,
        );
        closest
    }
}

impl RayCastAlgorithm for AllHits {
    type Params = ();
    type Result = Vec<RayHit>;

    fn ray_cast<E: Engine>(relay: &Relay<E>, p0: &Vec3, p1: &Vec3, _: ()) -> Self::Result {
        let mut hits = Vec::new();
        relay.ray_cast_raw(
            p0,
            p1,
            |hit| {
                hits.push(hit);
                RayControl::Continue
            },
            None::<NoPrefilter>,
            0,
        );
        hits
    }
}

impl RayCastAlgorithm for NClosestHits {
    type Params = usize;
    type Result = Vec<RayHit>;

    fn ray_cast<E: Engine>(relay: &Relay<E>, p0: &Vec3, p1: &Vec3, n: usize) -> Self::Result {
        let mut hits: Vec<RayHit> = Vec::new();
        if n == 0 {
            return hits;
        }

        relay.ray_cast_raw(
            p0,
            p1,
            |hit| {
                hits.push(hit);
                sort_hits(&mut hits);
                hits.truncate(n);
                if hits.len() == n {
                    RayControl::Clip(hits[n - 1].intersect_param)
                } else {
                    RayControl::Continue
                }
            },
            None::<NoPrefilter>,
            0,
        );
        hits
    }
}

impl<F, P> RayCastAlgorithm for Custom<F, P>
where
    F: FnMut(RayHit) -> RayControl,
    P: FnMut(Body, Collision) -> bool,
{
    type Params = CustomParams<F, P>;
    type Result = ();

    fn ray_cast<E: Engine>(relay: &Relay<E>, p0: &Vec3, p1: &Vec3, params: Self::Params) {
        relay.ray_cast_raw(p0, p1, params.filter, Some(params.prefilter), 0)
    }
}

fn sort_hits(hits: &mut [RayHit]) {
    hits.sort_by(|a, b| {
        a.intersect_param
            .partial_cmp(&b.intersect_param)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
