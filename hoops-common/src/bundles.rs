use crate::side::Side;
use core::ops::{Index, IndexMut};
use derivative::Derivative;
use serde::{Deserialize, Serialize};

#[derive(Derivative, Serialize, Deserialize)]
#[derivative(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomeAwayBundle<T> {
    pub home: T,
    pub away: T,
}

impl<T> HomeAwayBundle<T> {
    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        self.into_iter()
    }
}

impl<T> Index<Side> for HomeAwayBundle<T> {
    type Output = T;

    fn index(&self, side: Side) -> &Self::Output {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }
}

impl<T> IndexMut<Side> for HomeAwayBundle<T> {
    fn index_mut(&mut self, side: Side) -> &mut Self::Output {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }
}

pub struct HomeAwayBundleIterator<'a, T> {
    bundle: &'a HomeAwayBundle<T>,
    index: usize,
}

impl<'a, T> Iterator for HomeAwayBundleIterator<'a, T> {
    type Item = (Side, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let value = match self.index {
            0 => (Side::Home, &self.bundle.home),
            1 => (Side::Away, &self.bundle.away),
            _ => return None,
        };

        self.index += 1;
        Some(value)
    }
}

impl<'a, T> IntoIterator for &'a HomeAwayBundle<T> {
    type Item = (Side, &'a T);
    type IntoIter = HomeAwayBundleIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        HomeAwayBundleIterator {
            bundle: self,
            index: 0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_index_by_side() {
        let mut bundle = HomeAwayBundle { home: 3u16, away: 7 };
        assert_eq!(bundle[Side::Home], 3);
        assert_eq!(bundle[Side::Away], 7);
        bundle[Side::Away] += 2;
        assert_eq!(bundle.away, 9);
    }

    #[test]
    fn test_iter_order_is_home_first() {
        let bundle = HomeAwayBundle { home: "a", away: "b" };
        let collected: Vec<_> = bundle.iter().collect();
        assert_eq!(collected, vec![(Side::Home, &"a"), (Side::Away, &"b")]);
    }
}
