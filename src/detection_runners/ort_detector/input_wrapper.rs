use anyhow::Result;
use ndarray::{Array, IxDyn};

/// Model input, wrapper over [`Array<f32, IxDyn>`]
#[derive(Debug, Clone, Default)]
pub struct X(pub Array<f32, IxDyn>);

impl From<Array<f32, IxDyn>> for X {
    fn from(x: Array<f32, IxDyn>) -> Self {
        Self(x)
    }
}

impl From<Vec<f32>> for X {
    fn from(x: Vec<f32>) -> Self {
        Self(Array::from_vec(x).into_dyn().into_owned())
    }
}

impl std::ops::Deref for X {
    type Target = Array<f32, IxDyn>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl X {
    pub fn from_shape_vec(shape: &[usize], xs: Vec<f32>) -> Result<Self> {
        Ok(Self::from(Array::from_shape_vec(shape, xs)?))
    }

    pub fn ndim(&self) -> usize {
        self.0.ndim()
    }
}

/// Ordered collection of named tensors going into or coming out of a session.
#[derive(Debug, Clone, Default)]
pub struct Xs {
    names: Vec<String>,
    values: Vec<X>,
}

impl From<X> for Xs {
    fn from(x: X) -> Self {
        let mut xs = Self::new();
        xs.push(x);
        xs
    }
}

impl From<Vec<X>> for Xs {
    fn from(xs: Vec<X>) -> Self {
        let mut ys = Self::new();
        for x in xs {
            ys.push(x);
        }
        ys
    }
}

impl Xs {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(&mut self, x: X) {
        let name = format!("X{}", self.values.len());
        self.names.push(name);
        self.values.push(x);
    }

    pub fn push_kv(&mut self, name: &str, x: X) -> Result<()> {
        if self.names.iter().any(|n| n == name) {
            anyhow::bail!("Tensor named {} already present", name);
        }
        self.names.push(name.to_string());
        self.values.push(x);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&X> {
        self.names.iter().position(|n| n == name).map(|i| &self.values[i])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, X> {
        self.values.iter()
    }
}

impl std::ops::Index<usize> for Xs {
    type Output = X;

    fn index(&self, i: usize) -> &Self::Output {
        &self.values[i]
    }
}

impl IntoIterator for Xs {
    type Item = X;
    type IntoIter = std::vec::IntoIter<X>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}
