//! Board wiring and timing constants.
//!
//! | Function      | GPIO | Peripheral         |
//! |---------------|------|--------------------|
//! | Motor A (FR)  | 0    | PWM slice 0, ch A  |
//! | Motor B (RR)  | 1    | PWM slice 0, ch B  |
//! | Motor C (RL)  | 2    | PWM slice 1, ch A  |
//! | Motor D (FL)  | 3    | PWM slice 1, ch B  |
//! | IMU SDA       | 4    | I2C0               |
//! | IMU SCL       | 5    | I2C0               |
//! | Link TX       | 8    | UART1              |
//! | Link RX       | 9    | UART1              |
//! | IMU reset     | 14   | GPIO, active low   |
//! | LED           | 25   | On-board LED       |

/// Wireless serial link baud rate (HC-05 default).
pub const LINK_BAUD: u32 = 9_600;

/// IMU bus frequency.
pub const I2C_FREQUENCY_HZ: u32 = 400_000;

/// Control loop period.
pub const CONTROL_PERIOD_MS: u64 = 10;

/// Packets buffered between the link task and the flight task.
pub const PACKET_QUEUE_DEPTH: usize = 4;

/// Blackbox records kept in RAM.
pub const BLACKBOX_CAPACITY: usize = 2_048;

/// PWM counter wrap: one 50 Hz frame of 1 µs ticks.
pub const PWM_TOP: u16 = 20_000;
