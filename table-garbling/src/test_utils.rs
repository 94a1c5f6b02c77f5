//! Two-party test harness.

use crate::{
    config::SessionConfig,
    session::{Evaluator, Generator, Session},
};
use scuttlebutt::{unix_channel_pair, Block, UnixChannel};

pub(crate) const FIXED_KEY: Block = Block(0x0f0e_0d0c_0b0a_0908_0706_0504_0302_0100);
pub(crate) const SEED: Block = Block(0x2b7e_1516_28ae_d2a6_abf7_1588_09cf_4f3c);

/// Run `gen` as the generator on a spawned thread and `eval` as the
/// evaluator on this one, returning both results.
pub(crate) fn run_2pc<G, E, RG, RE>(gen: G, eval: E) -> (RG, RE)
where
    G: FnOnce(&mut Session<UnixChannel, Generator>) -> RG + Send + 'static,
    RG: Send + 'static,
    E: FnOnce(&mut Session<UnixChannel, Evaluator>) -> RE,
{
    run_2pc_with_config(SessionConfig::default(), gen, eval)
}

pub(crate) fn run_2pc_with_config<G, E, RG, RE>(
    config: SessionConfig,
    gen: G,
    eval: E,
) -> (RG, RE)
where
    G: FnOnce(&mut Session<UnixChannel, Generator>) -> RG + Send + 'static,
    RG: Send + 'static,
    E: FnOnce(&mut Session<UnixChannel, Evaluator>) -> RE,
{
    let _ = pretty_env_logger::try_init();
    let (sender, receiver) = unix_channel_pair();
    let config_ = config.clone();
    let handle = std::thread::spawn(move || {
        let mut session = Session::with_config(sender, FIXED_KEY, SEED, config_).unwrap();
        gen(&mut session)
    });
    let mut session = Session::with_config(receiver, FIXED_KEY, SEED, config).unwrap();
    let e = eval(&mut session);
    let g = handle.join().unwrap();
    (g, e)
}
