mod config;

use crate::config::Config;
use dotenv::dotenv;
use linux_embedded_hal::{Delay, I2cdev};
use log::{debug, info};
use mcplcd_gpio::expander::{Mcp23008, ShadowRegister};
use mcplcd_gpio::lcd::hd44780::driver::ExpanderHD44780Driver;
use mcplcd_gpio::lcd::hd44780::{Font, LiquidCrystal};
use mcplcd_gpio::{ExpanderPin, OutputRegister};
use std::thread::sleep;
use std::time::Duration;
use sysinfo::System;

type Lcd<'a> = LiquidCrystal<ExpanderHD44780Driver<'a, Delay>>;

const SMILEY: [u8; 8] = [
    0b00000,
    0b01010,
    0b01010,
    0b00000,
    0b10001,
    0b01110,
    0b00000,
    0b00000,
];

fn pin(index: u8) -> eyre::Result<ExpanderPin> {
    Ok(ExpanderPin::new(index)?)
}

fn main() -> eyre::Result<()> {
    dotenv().ok();
    pretty_env_logger::init();

    const UNKNOWN_STR: &str = "???";

    info!(
        "Hello, {}!",
        System::name().as_deref().unwrap_or(UNKNOWN_STR)
    );
    info!(
        "System ver {} kernel ver {}",
        System::long_os_version().as_deref().unwrap_or(UNKNOWN_STR),
        System::kernel_version().as_deref().unwrap_or(UNKNOWN_STR),
    );
    info!("Architecture {}", System::cpu_arch());

    debug!("Trying to load config...");
    let mut config = if let Some(config) = Config::try_load()? {
        info!("Config loaded.");
        config
    } else {
        info!("Config not found. Using default");
        let config = Config::default();
        config.save()?;
        info!("Default config saved.");
        config
    };
    config.apply_env()?;

    info!(
        "LCD @ {} 0x{:02x}, E: {}, RW: {:?}, RS: {}, Data: {:?}",
        config.i2c_bus, config.address, config.pin_e, config.pin_rw, config.pin_rs, config.pins_data
    );

    debug!("Initializing expander...");
    let i2c = I2cdev::new(&config.i2c_bus)?;
    let mut expander = Mcp23008::new(i2c, config.address)?;
    expander.set_direction(0x00)?;
    let mut register: Box<dyn OutputRegister> = if config.cache_register {
        Box::new(ShadowRegister::new(expander)?)
    } else {
        Box::new(expander)
    };
    debug!("{:?} initialized.", register);

    debug!("Initializing LCD driver...");
    let pin_e = pin(config.pin_e)?;
    let pin_rw = config.pin_rw.map(pin).transpose()?;
    let pin_rs = pin(config.pin_rs)?;
    let data_pins = config
        .pins_data
        .iter()
        .map(|&index| pin(index))
        .collect::<eyre::Result<Vec<_>>>()?;
    let driver = match data_pins.len() {
        4 => ExpanderHD44780Driver::new_4bit(
            &mut *register,
            pin_e,
            pin_rw,
            pin_rs,
            data_pins.try_into().map_err(|_| eyre::eyre!("Invalid number of data pins"))?,
            Delay,
        ),
        8 => ExpanderHD44780Driver::new_8bit(
            &mut *register,
            pin_e,
            pin_rw,
            pin_rs,
            data_pins.try_into().map_err(|_| eyre::eyre!("Invalid number of data pins"))?,
            Delay,
        ),
        n => return Err(eyre::eyre!("Invalid number of data pins: {}", n)),
    };

    let mut lcd = LiquidCrystal::new(driver);
    let font = if config.tall_font {
        Font::Dots5x10
    } else {
        Font::Dots5x8
    };
    lcd.begin(config.columns, config.lines, font)?;
    lcd.set_backlight(true)?;
    debug!("{:?} initialized.", lcd);

    write_test(&mut lcd)?;
    cursor_test(&mut lcd)?;
    scroll_test(&mut lcd, config.columns)?;
    custom_char_test(&mut lcd)?;
    backlight_test(&mut lcd)?;

    info!("All tests done.");
    Ok(())
}

fn write_test(lcd: &mut Lcd) -> eyre::Result<()> {
    info!("Test 1: write");
    lcd.clear()?;
    lcd.set_cursor(0, 0)?;
    lcd.print("Hello world!")?;
    lcd.set_cursor(0, 1)?;
    lcd.print("Test 1 success!")?;
    sleep(Duration::from_secs(2));
    Ok(())
}

fn cursor_test(lcd: &mut Lcd) -> eyre::Result<()> {
    info!("Test 2: cursor and blink");
    lcd.clear()?;
    lcd.print("Cursor Test")?;
    lcd.set_cursor(0, 1)?;
    lcd.set_cursor_visible(true)?;
    sleep(Duration::from_secs(2));
    lcd.set_blink(true)?;
    sleep(Duration::from_secs(2));
    lcd.set_blink(false)?;
    sleep(Duration::from_secs(1));
    lcd.set_cursor_visible(false)?;
    sleep(Duration::from_secs(1));
    lcd.print("Test 2 success!")?;
    sleep(Duration::from_secs(2));
    Ok(())
}

fn scroll_test(lcd: &mut Lcd, columns: u8) -> eyre::Result<()> {
    info!("Test 3: scrolling");
    lcd.clear()?;
    lcd.print("Scrolling test")?;
    lcd.set_cursor(0, 1)?;
    sleep(Duration::from_secs(1));
    for _ in 0..columns {
        lcd.scroll_display_left()?;
        sleep(Duration::from_millis(300));
    }
    for _ in 0..columns {
        lcd.scroll_display_right()?;
        sleep(Duration::from_millis(300));
    }
    lcd.print("Test 3 success!")?;
    Ok(())
}

fn custom_char_test(lcd: &mut Lcd) -> eyre::Result<()> {
    info!("Test 4: custom character");
    lcd.create_char(0, &SMILEY)?;
    lcd.clear()?;
    lcd.print("Custom char test")?;
    lcd.set_cursor(0, 1)?;
    lcd.print("Test 4 success ")?;
    lcd.write_byte(0)?;
    sleep(Duration::from_secs(2));
    Ok(())
}

fn backlight_test(lcd: &mut Lcd) -> eyre::Result<()> {
    info!("Test 5: backlight");
    lcd.clear()?;
    lcd.print("Backlight test")?;
    for _ in 0..5 {
        lcd.set_backlight(false)?;
        sleep(Duration::from_millis(300));
        lcd.set_backlight(true)?;
        sleep(Duration::from_millis(300));
    }
    lcd.set_cursor(0, 1)?;
    lcd.print("Test 5 success!")?;
    Ok(())
}
