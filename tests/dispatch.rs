mod common;

use common::*;
use si446x::{Callbacks, Error, Event, EventKind, RadioState};

const PACKET_SENT: u8 = 1 << 5;
const PACKET_RX: u8 = 1 << 4;
const CRC_ERROR: u8 = 1 << 3;
const SYNC_DETECT: u8 = 1 << 0;
const LOW_BATT: u8 = 1 << 1;
const WUT: u8 = 1 << 0;

#[test]
fn nothing_pending_fires_nothing() {
    let (mut radio, sim) = radio();
    radio.service().unwrap();
    assert!(take_events().is_empty());
    assert_eq!(sim.chip().commands(), [vec![0x20]]);
}

#[test]
fn received_packet_reports_length_and_rssi() {
    let (mut radio, sim) = radio();
    {
        let mut chip = sim.chip();
        chip.pending = [PACKET_RX, 0, 0];
        chip.rx_fifo.extend([3, 0xAA, 0xBB, 0xCC]);
        chip.latched_rssi = 100;
    }

    radio.service().unwrap();
    assert_eq!(
        take_events(),
        [Event::RxComplete {
            length: 3,
            rssi: -84
        }]
    );

    // Only the length byte was consumed
    let mut payload = [0u8; 3];
    radio.read(&mut payload).unwrap();
    assert_eq!(payload, [0xAA, 0xBB, 0xCC]);
}

#[test]
fn fixed_length_packet_leaves_fifo_untouched() {
    let (mut radio, sim) = radio_config(polled().with_fixed_length(2));
    {
        let mut chip = sim.chip();
        chip.pending = [PACKET_RX, 0, 0];
        chip.rx_fifo.extend([0x01, 0x02]);
    }

    radio.service().unwrap();
    assert_eq!(
        take_events(),
        [Event::RxComplete {
            length: 2,
            rssi: -134
        }]
    );
    assert_eq!(sim.chip().rx_fifo.len(), 2);
}

#[test]
fn crc_error_in_spi_active_forces_ready_once() {
    let (mut radio, sim) = radio();
    {
        let mut chip = sim.chip();
        // Sent to sleep by the invalid packet; the next access wakes it
        chip.state = SLEEP;
        chip.pending = [CRC_ERROR, 0, 0];
        chip.latched_rssi = 60;
    }

    radio.service().unwrap();

    assert_eq!(take_events(), [Event::RxInvalid { rssi: -104 }]);
    let chip = sim.chip();
    assert_eq!(chip.commands(), [vec![0x20], vec![0x34, 0x03]]);
    assert_eq!(chip.state, READY);
}

#[test]
fn crc_error_outside_spi_active_leaves_state() {
    let (mut radio, sim) = radio();
    {
        let mut chip = sim.chip();
        chip.state = RX;
        chip.pending = [CRC_ERROR, 0, 0];
    }

    radio.service().unwrap();
    assert_eq!(take_events(), [Event::RxInvalid { rssi: -134 }]);
    assert!(sim.chip().commands_with(0x34).is_empty());
}

#[test]
fn crc_error_with_spi_active_idle_state_is_not_corrected() {
    let config = polled().with_idle_state(RadioState::SpiActive);
    let (mut radio, sim) = radio_config(config);
    {
        let mut chip = sim.chip();
        chip.state = SLEEP;
        chip.pending = [CRC_ERROR, 0, 0];
    }

    radio.service().unwrap();
    assert_eq!(take_events(), [Event::RxInvalid { rssi: -134 }]);
    assert!(sim.chip().commands_with(0x34).is_empty());
}

#[test]
fn received_then_sent_in_order() {
    let (mut radio, sim) = radio();
    radio.configure_callbacks(Callbacks::SENT, true).unwrap();
    {
        let mut chip = sim.chip();
        chip.pending = [PACKET_RX | PACKET_SENT, 0, 0];
        chip.rx_fifo.push_back(5);
        chip.latched_rssi = 120;
    }

    radio.service().unwrap();
    assert_eq!(
        take_events(),
        [
            Event::RxComplete {
                length: 5,
                rssi: -74
            },
            Event::Sent
        ]
    );
}

#[test]
fn disabled_interrupts_are_ignored() {
    let (mut radio, sim) = radio();
    sim.chip().pending = [PACKET_SENT, SYNC_DETECT, LOW_BATT | WUT];

    radio.service().unwrap();
    assert!(take_events().is_empty());
    // Read and cleared all the same
    assert_eq!(sim.chip().pending, [0, 0, 0]);
}

#[test]
fn rx_begin_once_enabled() {
    let (mut radio, sim) = radio();
    radio.configure_callbacks(Callbacks::RX_BEGIN, true).unwrap();
    {
        let mut chip = sim.chip();
        chip.pending = [0, SYNC_DETECT, 0];
        chip.latched_rssi = 90;
    }

    radio.service().unwrap();
    assert_eq!(take_events(), [Event::RxBegin { rssi: -89 }]);
}

#[test]
fn full_dispatch_order() {
    let (mut radio, sim) = radio();
    radio
        .configure_callbacks(Callbacks::SENT | Callbacks::RX_BEGIN, true)
        .unwrap();
    radio
        .configure_wake_timer(5, 100, 0, si446x::WutFlags::RUN | si446x::WutFlags::BATT)
        .unwrap();
    {
        let mut chip = sim.chip();
        chip.state = RX;
        chip.pending = [
            PACKET_SENT | PACKET_RX | CRC_ERROR,
            SYNC_DETECT,
            LOW_BATT | WUT,
        ];
        chip.rx_fifo.push_back(1);
    }

    radio.service().unwrap();
    assert_eq!(
        take_events(),
        [
            Event::RxBegin { rssi: -134 },
            Event::RxComplete {
                length: 1,
                rssi: -134
            },
            Event::RxInvalid { rssi: -134 },
            Event::Sent,
            Event::LowBattery,
            Event::WakeTimer,
        ]
    );
}

#[test]
fn unregistered_handlers_do_not_change_dispatch() {
    let (mut radio, sim) = radio();
    radio.handlers_mut().clear(EventKind::RxComplete);
    {
        let mut chip = sim.chip();
        chip.pending = [PACKET_RX | CRC_ERROR, 0, 0];
        chip.state = RX;
        chip.rx_fifo.push_back(9);
    }

    radio.service().unwrap();
    assert_eq!(take_events(), [Event::RxInvalid { rssi: -134 }]);
    // The length byte is consumed whether or not anyone listens
    assert!(sim.chip().rx_fifo.is_empty());
}

#[test]
fn events_stay_suppressed_while_servicing() {
    let (mut radio, sim) = radio();
    sim.chip().pending = [CRC_ERROR, 0, 0];
    sim.chip().state = SLEEP;

    radio.service().unwrap();
    let chip = sim.chip();
    assert_eq!(chip.masked_at_command, [true, true]);
    assert!(!chip.line_masked);
}

#[test]
fn status_timeout_abandons_dispatch() {
    let (mut radio, sim) = radio_config(polled().with_cts_timing(4, 1));
    {
        let mut chip = sim.chip();
        chip.never_ready = true;
        chip.pending = [PACKET_RX, 0, 0];
    }

    assert_eq!(radio.service(), Err(Error::CommandTimeout));
    assert_eq!(take_events(), [Event::CommandTimeout]);

    let chip = sim.chip();
    assert_eq!(chip.frames.len(), 4);
    assert!(chip.commands().is_empty());
}

#[test]
fn command_timeout_reported_once_per_operation() {
    let (mut radio, sim) = radio_config(polled().with_cts_timing(3, 1));
    sim.chip().never_ready = true;

    assert_eq!(radio.receive(2), Err(Error::CommandTimeout));
    assert_eq!(take_events(), [Event::CommandTimeout]);
    assert!(sim.chip().commands().is_empty());

    // The radio recovers and later operations go through
    sim.chip().never_ready = false;
    radio.receive(2).unwrap();
    assert!(take_events().is_empty());
    assert_eq!(sim.chip().commands().len(), 4);
}

#[test]
fn timeout_mid_transmit_stops_writing() {
    let (mut radio, sim) = radio_config(polled().with_cts_timing(2, 1));
    {
        let mut chip = sim.chip();
        chip.state = READY;
        // CHANGE_STATE, FIFO_INFO and the interrupt clear go through, the
        // length property write after the FIFO load does not
        chip.stall_after = Some(3);
    }

    assert_eq!(
        radio.transmit(&[1, 2, 3], 0, RadioState::Ready),
        Err(Error::CommandTimeout)
    );
    assert_eq!(take_events(), [Event::CommandTimeout]);

    let chip = sim.chip();
    assert_eq!(
        chip.commands(),
        [
            vec![0x34, 0x03],
            vec![0x15, 0x03],
            vec![0x20, 0x00, 0x00, 0xFF],
            vec![0x66, 0x03, 1, 2, 3],
        ]
    );
    assert!(chip.commands_with(0x11).is_empty());
    assert!(chip.commands_with(0x31).is_empty());
}

#[test]
fn timeout_after_status_read_still_delivers_events() {
    let (mut radio, sim) = radio_config(polled().with_cts_timing(3, 1));
    radio.configure_callbacks(Callbacks::SENT, true).unwrap();
    {
        let mut chip = sim.chip();
        chip.clear_log();
        chip.state = SLEEP;
        chip.pending = [CRC_ERROR | PACKET_SENT, 0, LOW_BATT];
        // Only the interrupt status handshake is answered
        chip.stall_after = Some(2);
    }
    let _ = take_events();

    assert_eq!(radio.service(), Err(Error::CommandTimeout));
    assert_eq!(
        take_events(),
        [
            Event::CommandTimeout,
            Event::RxInvalid { rssi: -134 },
            Event::Sent,
        ]
    );

    let chip = sim.chip();
    assert_eq!(chip.commands(), [vec![0x20]]);
    assert_eq!(chip.pending, [0, 0, 0]);
}

#[test]
fn timeout_after_status_read_reported_once() {
    let (mut radio, sim) = radio_config(polled().with_cts_timing(2, 1));
    radio
        .configure_wake_timer(1, 1, 0, si446x::WutFlags::RUN | si446x::WutFlags::BATT)
        .unwrap();
    {
        let mut chip = sim.chip();
        chip.state = SLEEP;
        chip.pending = [CRC_ERROR, 0, LOW_BATT | WUT];
        chip.stall_after = Some(2);
    }
    let _ = take_events();

    assert_eq!(radio.service(), Err(Error::CommandTimeout));
    assert_eq!(
        take_events(),
        [
            Event::CommandTimeout,
            Event::RxInvalid { rssi: -134 },
            Event::LowBattery,
            Event::WakeTimer,
        ]
    );
}

#[test]
fn service_on_event_waits_for_line() {
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};

    let (mut radio, sim) = radio();
    sim.chip().pending = [PACKET_RX, 0, 0];
    sim.chip().rx_fifo.push_back(4);

    let mut irq = PinMock::new(&[Transaction::wait_for_state(State::Low)]);
    tokio_test::block_on(radio.service_on_event(&mut irq)).unwrap();
    irq.done();

    assert_eq!(
        take_events(),
        [Event::RxComplete {
            length: 4,
            rssi: -134
        }]
    );
}
