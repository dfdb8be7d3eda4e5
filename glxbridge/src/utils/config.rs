use std::{env, str::FromStr};

pub const DEFAULT_LIBGL: &str = "libGL.so.1";
pub const DEFAULT_LIBX11: &str = "libX11.so.6";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // accept contexts without direct rendering (e.g. llvmpipe over indirect GLX)
    pub allow_software_gl: bool,
    pub debug_mode: bool,
    // libraries the foreign calls are resolved from
    pub libgl_path: String,
    pub libx11_path: String,
}

fn get<T: FromStr>(value: Option<String>, default: T) -> T {
    match value {
        Some(val) => val.parse::<T>().unwrap_or(default),
        None => default,
    }
}

fn booleanify(value: Option<String>, default: bool) -> bool {
    match value {
        Some(value) => match value.as_str() {
            "true" => true,
            "false" => false,
            "1" => true,
            "0" => false,
            "yes" => true,
            "no" => false,
            _ => default,
        },
        None => default,
    }
}

impl Config {
    pub fn from_env() -> Config {
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key/value source, `from_env` uses the process environment.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Config {
        Config {
            allow_software_gl: booleanify(lookup("ALLOW_SOFTWARE_GL"), false),
            debug_mode: booleanify(lookup("DEBUG_GLXB"), false),
            libgl_path: get(lookup("GLXB_LIBGL"), DEFAULT_LIBGL.to_owned()),
            libx11_path: get(lookup("GLXB_LIBX11"), DEFAULT_LIBX11.to_owned()),
        }
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            allow_software_gl: false,
            debug_mode: false,
            libgl_path: DEFAULT_LIBGL.to_owned(),
            libx11_path: DEFAULT_LIBX11.to_owned(),
        }
    }
}
