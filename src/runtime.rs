// Copyright (c) 2026 softveil

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheme {
    Steam,
    Moonlit,
    Amber,
    Mint,
    Rose,
    Ember,
}
