use std::collections::HashMap;

use json::JsonValue;

/// A host function: takes and returns foreign values, failing with a message.
pub type HostFn = fn(&[JsonValue]) -> Result<JsonValue, String>;

macro_rules! host {
    ($m: ident, $module: ident :: $e: ident) => {
        $m.entry(stringify!($module))
            .or_insert_with(HashMap::new)
            .insert(stringify!($e), $module::$e as HostFn)
    };
}

lazy_static! {
    pub static ref HOST: HashMap<&'static str, HashMap<&'static str, HostFn>> = {
        let mut m = HashMap::new();
        host!(m, math::floor);
        host!(m, math::ceil);
        host!(m, math::abs);
        host!(m, math::sqrt);
        host!(m, math::pow);
        host!(m, math::min);
        host!(m, math::max);
        host!(m, string::upper);
        host!(m, string::lower);
        host!(m, string::length);
        host!(m, string::concat);
        host!(m, string::repeat);
        m
    };
}

/// Look up a host function by module and name.
pub fn lookup(module: &str, name: &str) -> Option<HostFn> {
    HOST.get(module).and_then(|functions| functions.get(name)).copied()
}

fn number(args: &[JsonValue], index: usize) -> Result<f64, String> {
    match args.get(index) {
        Some(arg) => arg
            .as_f64()
            .ok_or_else(|| format!("argument {} should be a number", index + 1)),
        None => Err(format!("missing argument {}", index + 1)),
    }
}

fn text(args: &[JsonValue], index: usize) -> Result<&str, String> {
    match args.get(index) {
        Some(arg) => arg
            .as_str()
            .ok_or_else(|| format!("argument {} should be a string", index + 1)),
        None => Err(format!("missing argument {}", index + 1)),
    }
}

mod math {
    use json::JsonValue;

    use super::number;

    pub fn floor(args: &[JsonValue]) -> Result<JsonValue, String> {
        Ok(number(args, 0)?.floor().into())
    }

    pub fn ceil(args: &[JsonValue]) -> Result<JsonValue, String> {
        Ok(number(args, 0)?.ceil().into())
    }

    pub fn abs(args: &[JsonValue]) -> Result<JsonValue, String> {
        Ok(number(args, 0)?.abs().into())
    }

    pub fn sqrt(args: &[JsonValue]) -> Result<JsonValue, String> {
        let x = number(args, 0)?;
        if x < 0.0 {
            return Err(format!("square root of negative number {}", x));
        }
        Ok(x.sqrt().into())
    }

    pub fn pow(args: &[JsonValue]) -> Result<JsonValue, String> {
        Ok(number(args, 0)?.powf(number(args, 1)?).into())
    }

    fn fold(args: &[JsonValue], pick: fn(f64, f64) -> f64) -> Result<JsonValue, String> {
        let mut acc = number(args, 0)?;
        for i in 1..args.len() {
            acc = pick(acc, number(args, i)?);
        }
        Ok(acc.into())
    }

    pub fn min(args: &[JsonValue]) -> Result<JsonValue, String> {
        fold(args, f64::min)
    }

    pub fn max(args: &[JsonValue]) -> Result<JsonValue, String> {
        fold(args, f64::max)
    }
}

mod string {
    use json::JsonValue;

    use super::{number, text};

    pub fn upper(args: &[JsonValue]) -> Result<JsonValue, String> {
        Ok(text(args, 0)?.to_uppercase().into())
    }

    pub fn lower(args: &[JsonValue]) -> Result<JsonValue, String> {
        Ok(text(args, 0)?.to_lowercase().into())
    }

    pub fn length(args: &[JsonValue]) -> Result<JsonValue, String> {
        Ok((text(args, 0)?.chars().count() as f64).into())
    }

    pub fn concat(args: &[JsonValue]) -> Result<JsonValue, String> {
        let mut result = String::new();
        for i in 0..args.len() {
            result.push_str(text(args, i)?);
        }
        Ok(result.into())
    }

    pub fn repeat(args: &[JsonValue]) -> Result<JsonValue, String> {
        let base = text(args, 0)?;
        let count = number(args, 1)?;
        if count < 0.0 || count.fract() != 0.0 {
            return Err(format!("can't repeat a string {} times", count));
        }
        Ok(base.repeat(count as usize).into())
    }
}
