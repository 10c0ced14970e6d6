use cgmath::{Point3, Vector3};
use rapier3d::prelude::*;

pub fn nvec_to_cgmath(vec: &Vector<Real>) -> Vector3<f32> {
    Vector3 {
        x: vec.x,
        y: vec.y,
        z: vec.z,
    }
}

pub fn nvec_to_cgpoint(vec: &Vector<Real>) -> Point3<f32> {
    Point3 {
        x: vec.x,
        y: vec.y,
        z: vec.z,
    }
}

pub fn npoint_to_cgmath(point: Point<Real>) -> Point3<f32> {
    Point3 {
        x: point.x,
        y: point.y,
        z: point.z,
    }
}

pub fn point_to_npoint(point: Point3<f32>) -> Point<Real> {
    point![point.x, point.y, point.z]
}

pub fn point_to_nvec(point: Point3<f32>) -> Vector<Real> {
    vector![point.x, point.y, point.z]
}

pub fn vec_to_nvec(vec: Vector3<f32>) -> Vector<Real> {
    vector![vec.x, vec.y, vec.z]
}
