//! Nested groups of params.
//!
//! A command is declared over any [`Config`]: a single param, a `Vec` of
//! configs, or a tuple of configs nested arbitrarily. The shape of the
//! declaration is the shape of the decoded value. Flattening and decoding
//! both walk the tree depth-first in declaration order, which is also the
//! order positional arguments bind in.

use crate::param::{Input, Kind, Param, ParamInfo, ParseResult};

pub trait Config: Send + Sync + 'static {
    type Output;

    /// Appends every leaf param, in declaration order.
    fn params(&self, out: &mut Vec<ParamInfo>);

    fn decode<'a>(&self, input: Input<'a>) -> ParseResult<'a, Self::Output>;
}

pub trait ConfigExt: Config + Sized {
    /// Builds the caller's own type out of the decoded tree.
    fn map_output<T, F>(self, f: F) -> MapOutput<Self, F>
    where
        F: Fn(Self::Output) -> T + Send + Sync + 'static,
    {
        MapOutput { config: self, f }
    }

    fn flatten(&self) -> Vec<ParamInfo> {
        let mut res = Vec::new();
        self.params(&mut res);
        res
    }
}

impl<C: Config> ConfigExt for C {}

impl<K: Kind, A: 'static> Config for Param<K, A> {
    type Output = A;

    fn params(&self, out: &mut Vec<ParamInfo>) {
        out.extend(Param::params(self))
    }

    fn decode<'a>(&self, input: Input<'a>) -> ParseResult<'a, A> {
        self.parse(input)
    }
}

impl<C: Config> Config for Vec<C> {
    type Output = Vec<C::Output>;

    fn params(&self, out: &mut Vec<ParamInfo>) {
        self.iter().for_each(|it| it.params(out))
    }

    fn decode<'a>(&self, mut input: Input<'a>) -> ParseResult<'a, Self::Output> {
        let mut res = Vec::with_capacity(self.len());
        for config in self {
            let (rest, value) = config.decode(input)?;
            input.arguments = rest;
            res.push(value);
        }
        Ok((input.arguments, res))
    }
}

impl Config for () {
    type Output = ();

    fn params(&self, _out: &mut Vec<ParamInfo>) {}

    fn decode<'a>(&self, input: Input<'a>) -> ParseResult<'a, ()> {
        Ok((input.arguments, ()))
    }
}

macro_rules! tuple_config {
    ($($name:ident)+) => {
        #[allow(non_snake_case)]
        impl<$($name: Config),+> Config for ($($name,)+) {
            type Output = ($($name::Output,)+);

            fn params(&self, out: &mut Vec<ParamInfo>) {
                let ($($name,)+) = self;
                $($name.params(out);)+
            }

            fn decode<'a>(&self, mut input: Input<'a>) -> ParseResult<'a, Self::Output> {
                let ($($name,)+) = self;
                $(
                    let (rest, $name) = $name.decode(input)?;
                    input.arguments = rest;
                )+
                Ok((input.arguments, ($($name,)+)))
            }
        }
    };
}

tuple_config!(A);
tuple_config!(A B);
tuple_config!(A B C);
tuple_config!(A B C D);
tuple_config!(A B C D E);
tuple_config!(A B C D E F);
tuple_config!(A B C D E F G);
tuple_config!(A B C D E F G H);
tuple_config!(A B C D E F G H I);
tuple_config!(A B C D E F G H I J);
tuple_config!(A B C D E F G H I J K);
tuple_config!(A B C D E F G H I J K L);

pub struct MapOutput<C, F> {
    config: C,
    f: F,
}

impl<C, F, T> Config for MapOutput<C, F>
where
    C: Config,
    F: Fn(C::Output) -> T + Send + Sync + 'static,
{
    type Output = T;

    fn params(&self, out: &mut Vec<ParamInfo>) {
        self.config.params(out)
    }

    fn decode<'a>(&self, input: Input<'a>) -> ParseResult<'a, T> {
        let (rest, value) = self.config.decode(input)?;
        Ok((rest, (self.f)(value)))
    }
}
