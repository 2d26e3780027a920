// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use smallvec::SmallVec;

/// Most faces and vertex fans in the meshes we deal with have a handful of
/// elements, so those lists live on the stack.
pub type SVec<T> = SmallVec<[T; 4]>;

pub trait IteratorUtils: Iterator {
    fn collect_svec(self) -> SVec<Self::Item>
    where
        Self: Sized,
    {
        self.collect()
    }
}

impl<T: ?Sized> IteratorUtils for T where T: Iterator {}

pub trait SliceUtils<T> {
    /// Same as .iter().copied(), but doesn't trigger rustfmt line breaks
    fn iter_cpy(&self) -> std::iter::Copied<std::slice::Iter<'_, T>>;
}

impl<T: Copy> SliceUtils<T> for [T] {
    fn iter_cpy(&self) -> std::iter::Copied<std::slice::Iter<'_, T>> {
        self.iter().copied()
    }
}

/// Returns the arithmetic mean of a list of points, or `None` for an empty
/// list.
pub fn mean_point(points: impl IntoIterator<Item = glam::Vec3>) -> Option<glam::Vec3> {
    let (sum, count) = points
        .into_iter()
        .fold((glam::Vec3::ZERO, 0usize), |(sum, count), p| (sum + p, count + 1));
    (count > 0).then(|| sum / count as f32)
}

#[cfg(test)]
mod test {
    use super::*;
    use glam::Vec3;

    #[test]
    pub fn test_mean_point() {
        assert_eq!(mean_point(std::iter::empty()), None);
        assert_eq!(
            mean_point([Vec3::ZERO, Vec3::new(2.0, 4.0, -2.0)]),
            Some(Vec3::new(1.0, 2.0, -1.0))
        );
    }
}
