#![no_std]
#![no_main]

use cortex_m::peripheral::SCB;
use defmt::{error, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C0, UART1};
use embassy_rp::pwm::Pwm;
use embassy_rp::uart::{Config as UartConfig, Uart};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Delay, Duration, Ticker};
use flight_firmware::board::{
    BLACKBOX_CAPACITY, CONTROL_PERIOD_MS, I2C_FREQUENCY_HZ, LINK_BAUD, PACKET_QUEUE_DEPTH,
};
use flight_firmware::{
    esc_config, BlockingTx, Bno055, DumpError, FlightConfig, FlightController, FlightMode,
    PacketLine, PacketSource, PwmActuators, UartPacketSource,
};
use portable_atomic::{AtomicU32, Ordering};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART1_IRQ => embassy_rp::uart::InterruptHandler<UART1>;
});

type Imu = Bno055<I2c<'static, I2C0, i2c::Blocking>, Output<'static>>;
type Controller = FlightController<Imu, Delay, PwmActuators<'static>, BLACKBOX_CAPACITY>;

const CONFIG: FlightConfig = FlightConfig::DEFAULT;

/// Raw command lines from the link task to the flight task.
static PACKETS: Channel<CriticalSectionRawMutex, PacketLine, PACKET_QUEUE_DEPTH> = Channel::new();

/// Lines thrown away because the flight task fell behind.
static DROPPED_PACKETS: AtomicU32 = AtomicU32::new(0);

/// The controller holds the blackbox, too big for a task stack.
static CONTROLLER: StaticCell<Controller> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Flight controller starting...");
    defmt::unwrap!(CONFIG.validate());

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- Link UART Setup ---
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = LINK_BAUD;

    let uart = Uart::new(
        p.UART1,
        p.PIN_8, // TX
        p.PIN_9, // RX
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        uart_config,
    );
    let (tx, rx) = uart.split();
    let link = UartPacketSource::new(rx);
    let dump = BlockingTx::new(tx);

    // --- IMU Setup ---
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2C_FREQUENCY_HZ;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config); // SCL, SDA
    let imu_reset = Output::new(p.PIN_14, Level::High);
    let imu = Bno055::new(i2c, imu_reset);

    // --- Motor PWM Setup ---
    // Hold the ESCs at the lowest arming pulse from the first cycle.
    let idle = CONFIG.arming.min_pulse;
    let slice_ab = Pwm::new_output_ab(p.PWM_SLICE0, p.PIN_0, p.PIN_1, esc_config(idle));
    let slice_cd = Pwm::new_output_ab(p.PWM_SLICE1, p.PIN_2, p.PIN_3, esc_config(idle));
    let actuators = PwmActuators::new(slice_ab, slice_cd, idle);

    // On-board LED: lit while calibrating, blinks while arming, toggles on loop errors
    let led = Output::new(p.PIN_25, Level::Low);

    let controller = CONTROLLER.init_with(|| FlightController::new(imu, Delay, actuators, CONFIG));

    // Spawn tasks (unwrap the SpawnToken, then spawn)
    spawner.spawn(link_task(link).unwrap());
    spawner.spawn(flight_task(controller, dump, led).unwrap());

    info!("Flight controller initialized");
}

/// Link task - reads command lines and queues them for the flight task.
#[embassy_executor::task]
async fn link_task(mut link: UartPacketSource<'static>) {
    loop {
        match link.receive().await {
            Ok(line) => {
                if PACKETS.try_send(line).is_err() {
                    let dropped = DROPPED_PACKETS.fetch_add(1, Ordering::Relaxed) + 1;
                    warn!("Packet queue full, {} dropped so far", dropped);
                }
            }
            Err(e) => error!("Link error: {:?}", e),
        }
    }
}

/// Flight task - sensor bring-up, arming, then the control loop.
#[embassy_executor::task]
async fn flight_task(
    controller: &'static mut Controller,
    mut dump: BlockingTx<'static>,
    mut led: Output<'static>,
) {
    led.set_high();
    if let Err(e) = controller.init() {
        error!("IMU bring-up failed: {:?}, resetting", e);
        SCB::sys_reset();
    }
    led.set_low();
    info!("IMU ready, arming ESCs");

    controller.begin_arming();
    let mut ticker = Ticker::every(Duration::from_millis(u64::from(
        CONFIG.arming.step_period_ms,
    )));
    while controller.mode() != FlightMode::Armed {
        ticker.next().await;
        led.toggle();
        apply_pending(controller);
        run_step(controller, &mut led);
        service_dump(controller, &mut dump);
    }
    led.set_low();
    info!("Armed, entering control loop");

    let mut ticker = Ticker::every(Duration::from_millis(CONTROL_PERIOD_MS));
    loop {
        match select(ticker.next(), PACKETS.receive()).await {
            Either::First(()) => {
                apply_pending(controller);
                run_step(controller, &mut led);
                service_dump(controller, &mut dump);
            }
            Either::Second(line) => {
                // Rejections are logged by the decoder
                let _ = controller.handle_packet(&line);
            }
        }
    }
}

/// Apply every queued packet, oldest first.
fn apply_pending(controller: &mut Controller) {
    while let Ok(line) = PACKETS.try_receive() {
        let _ = controller.handle_packet(&line);
    }
}

fn run_step(controller: &mut Controller, led: &mut Output<'static>) {
    if let Err(e) = controller.step() {
        error!("Control step failed: {:?}", e);
        led.toggle();
    }
}

fn service_dump(controller: &mut Controller, dump: &mut BlockingTx<'static>) {
    match controller.service_dump(dump) {
        Ok(records) => info!("Blackbox dumped, {} records", records),
        Err(DumpError::NotRequested) | Err(DumpError::InFlight) => {}
        Err(e) => error!("Blackbox dump failed: {:?}", e),
    }
}
