/// Smallest currency unit per seele.
pub const FAN_PER_SEELE: u64 = 100_000_000;

/// Number of blocks sharing one reward table entry.
pub const BLOCK_NUMBER_PER_ERA: u64 = 3_150_000;

/// Block reward per era, in fan.
pub const REWARD_TABLE: [u64; 5] = [
    15 * FAN_PER_SEELE,
    10 * FAN_PER_SEELE,
    8 * FAN_PER_SEELE,
    6 * FAN_PER_SEELE,
    4 * FAN_PER_SEELE,
];

/// Block reward once every tabulated era has passed, in fan.
pub const TAIL_REWARD: u64 = 3 * FAN_PER_SEELE;

/// Reward for mining block `block_number`, in fan.
pub fn reward(block_number: u64) -> u64 {
    let era = block_number / BLOCK_NUMBER_PER_ERA;
    usize::try_from(era)
        .ok()
        .and_then(|era| REWARD_TABLE.get(era))
        .copied()
        .unwrap_or(TAIL_REWARD)
}
