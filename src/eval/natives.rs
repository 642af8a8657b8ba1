use crate::eval::NativeFn;

/// Host functions an `extern` declaration can bind to, keyed by name and arity.
const NATIVES: &[(&str, usize, NativeFn)] = &[
    ("sin", 1, |args: &[f64]| args[0].sin()),
    ("cos", 1, |args: &[f64]| args[0].cos()),
    ("tan", 1, |args: &[f64]| args[0].tan()),
    ("sqrt", 1, |args: &[f64]| args[0].sqrt()),
    ("exp", 1, |args: &[f64]| args[0].exp()),
    ("log", 1, |args: &[f64]| args[0].ln()),
    ("fabs", 1, |args: &[f64]| args[0].abs()),
    ("floor", 1, |args: &[f64]| args[0].floor()),
    ("ceil", 1, |args: &[f64]| args[0].ceil()),
    ("pow", 2, |args: &[f64]| args[0].powf(args[1])),
    ("atan2", 2, |args: &[f64]| args[0].atan2(args[1])),
];

pub fn lookup(name: &str, arity: usize) -> Option<NativeFn> {
    NATIVES
        .iter()
        .find(|(native_name, native_arity, _)| *native_name == name && *native_arity == arity)
        .map(|(_, _, native)| *native)
}
