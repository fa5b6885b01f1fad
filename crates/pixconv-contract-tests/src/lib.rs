#![forbid(unsafe_code)]


#[cfg(test)]
mod determinism;

#[cfg(test)]
mod properties;

#[cfg(test)]
mod reference;

#[cfg(test)]
mod scenarios;
